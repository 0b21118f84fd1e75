use std::fmt;

use int_enum::IntEnum;

/// Which of the two batch trees a message refers to.
///
/// The wire carries this as a small batch index.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, IntEnum)]
pub enum TreeKind {
    /// The tree whose leaves are the new VTXOs.
    Vtxo = 0,

    /// The tree linking forfeit transactions to the commitment transaction.
    Connector = 1,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TreeKind::Vtxo => "vtxo",
            TreeKind::Connector => "connector",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_batch_index() {
        assert_eq!(TreeKind::try_from(0u8).ok(), Some(TreeKind::Vtxo));
        assert_eq!(TreeKind::try_from(1u8).ok(), Some(TreeKind::Connector));
        assert!(TreeKind::try_from(2u8).is_err());
        assert_eq!(u8::from(TreeKind::Connector), 1);
    }
}
