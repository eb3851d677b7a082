use alloy_primitives::{Address, Bytes, U256};

/// Safe operation kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One on-chain invocation inside a proposal batch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Call {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

impl Call {
    /// A zero-value call.
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
            value: U256::ZERO,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_defaults_to_zero_value() {
        let call = Call::new(Address::ZERO, vec![0xde, 0xad]);
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(call.data.as_ref(), &[0xde, 0xad]);
    }

    #[test]
    fn test_operation_discriminants() {
        assert_eq!(Operation::Call.as_u8(), 0);
        assert_eq!(Operation::DelegateCall.as_u8(), 1);
        assert_eq!(Operation::default(), Operation::Call);
    }
}
