/// Marker value the sensor firmware writes into every genuine record.
pub const DEFAULT_EXPECTED_TAG: u16 = 21212;

/// Controls record classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Tag a decrypted record must carry to be accepted.
    pub expected_tag: u16,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            expected_tag: DEFAULT_EXPECTED_TAG,
        }
    }
}
