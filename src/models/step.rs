use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ServiceSelection,
    DateTimeSelection,
    Confirmation,
    Success,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::ServiceSelection => "service_selection",
            WizardStep::DateTimeSelection => "date_time_selection",
            WizardStep::Confirmation => "confirmation",
            WizardStep::Success => "success",
        }
    }

    /// 1-based position, as shown in the step indicator.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::ServiceSelection => 1,
            WizardStep::DateTimeSelection => 2,
            WizardStep::Confirmation => 3,
            WizardStep::Success => 4,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::ServiceSelection => None,
            WizardStep::DateTimeSelection => Some(WizardStep::ServiceSelection),
            WizardStep::Confirmation => Some(WizardStep::DateTimeSelection),
            WizardStep::Success => Some(WizardStep::Confirmation),
        }
    }
}
