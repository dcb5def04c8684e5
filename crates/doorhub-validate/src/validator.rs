use doorhub_frame::TelemetryRecord;

use crate::config::ValidatorConfig;

/// Outcome of checking one decrypted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Valid,
    Invalid,
}

impl Classification {
    pub fn is_valid(self) -> bool {
        matches!(self, Classification::Valid)
    }
}

/// Classifies records by their tag field alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator with the default expected tag.
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Create a validator with explicit config.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Valid iff `record.tag` equals the expected tag. No other field is read.
    pub fn classify(&self, record: &TelemetryRecord) -> Classification {
        if record.tag == self.config.expected_tag {
            Classification::Valid
        } else {
            tracing::trace!(
                tag = record.tag,
                expected = self.config.expected_tag,
                "tag mismatch"
            );
            Classification::Invalid
        }
    }

    /// Current validator configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use doorhub_frame::DoorState;

    use super::*;
    use crate::config::DEFAULT_EXPECTED_TAG;

    #[test]
    fn expected_tag_is_valid() {
        let record = TelemetryRecord::new(DEFAULT_EXPECTED_TAG, DoorState::Open, 3, 3300);
        assert_eq!(Validator::new().classify(&record), Classification::Valid);
    }

    #[test]
    fn other_tags_are_invalid() {
        let validator = Validator::new();
        for tag in [0u16, 1, DEFAULT_EXPECTED_TAG - 1, DEFAULT_EXPECTED_TAG + 1, u16::MAX] {
            let record = TelemetryRecord::new(tag, DoorState::Open, 3, 3300);
            assert_eq!(validator.classify(&record), Classification::Invalid);
        }
    }

    #[test]
    fn classification_ignores_every_other_field() {
        let validator = Validator::new();
        let mut a = TelemetryRecord::new(DEFAULT_EXPECTED_TAG, DoorState::Closed, 0, 0);
        let mut b = TelemetryRecord::new(DEFAULT_EXPECTED_TAG, DoorState::Open, 255, u16::MAX);
        b.reserved = [0xAA; doorhub_frame::RESERVED_SIZE];
        assert_eq!(validator.classify(&a), validator.classify(&b));

        a.tag = 7;
        b.tag = 7;
        assert_eq!(validator.classify(&a), Classification::Invalid);
        assert_eq!(validator.classify(&b), Classification::Invalid);
    }

    #[test]
    fn configured_tag_replaces_default() {
        let validator = Validator::with_config(ValidatorConfig { expected_tag: 0xBEEF });
        let record = TelemetryRecord::new(0xBEEF, DoorState::Open, 1, 3000);
        assert!(validator.classify(&record).is_valid());

        let record = TelemetryRecord::new(DEFAULT_EXPECTED_TAG, DoorState::Open, 1, 3000);
        assert!(!validator.classify(&record).is_valid());
        assert_eq!(validator.config().expected_tag, 0xBEEF);
    }
}
