// Roll results returned by the dice service

/// Kind of a single die as reported in `rands[].kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DieKind {
    Normal,
    D10,
    D9,
    Undefined,
}

impl DieKind {
    /// Unknown kinds degrade to `Undefined` instead of failing the whole roll
    pub fn from_kind(kind: &str) -> Self {
        match kind {
            "normal" => DieKind::Normal,
            "tens_d10" => DieKind::D10,
            "d9" => DieKind::D9,
            _ => DieKind::Undefined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieResult {
    pub kind: DieKind,
    pub sides: i32,
    pub value: i32,
}

/// A validated roll. Only built by `api::response::decode_roll`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollResult {
    pub text: String,
    pub is_secret: bool,
    pub is_success: bool,
    /// Critical or fumble
    pub is_decisive: bool,
    /// Never empty
    pub dice: Vec<DieResult>,
}
