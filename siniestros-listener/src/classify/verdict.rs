#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Blocked,
}

impl Verdict {
    pub fn is_blocked(self) -> bool {
        matches!(self, Verdict::Blocked)
    }

    /// Value of the `action` field in access lines.
    pub fn kind_str(self) -> &'static str {
        match self {
            Verdict::Allowed => "allow",
            Verdict::Blocked => "block",
        }
    }
}
