use bytes::Bytes;

/// Value read back from the chip's property table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// A single property (read with a count of one).
    Scalar(u8),
    /// Consecutive properties starting at the requested index.
    Sequence(Bytes),
}

impl PropertyValue {
    pub(crate) fn from_response(rsp: Bytes) -> Self {
        if rsp.len() == 1 {
            PropertyValue::Scalar(rsp[0])
        } else {
            PropertyValue::Sequence(rsp)
        }
    }

    /// The raw property bytes, whichever shape they came in.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PropertyValue::Scalar(value) => std::slice::from_ref(value),
            PropertyValue::Sequence(values) => values.as_ref(),
        }
    }

    /// The single value, if this is a scalar.
    pub fn scalar(&self) -> Option<u8> {
        match self {
            PropertyValue::Scalar(value) => Some(*value),
            PropertyValue::Sequence(_) => None,
        }
    }
}
