use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Control, ElementRef},
    error::PiineError,
};

/// Name used for the global unload signal in scripts and logs.
pub const UNLOAD_NAME: &str = "unload";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "element", rename_all = "snake_case")]
pub enum TriggerSource {
    Window,
    Element(ElementRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Click,
    Unload,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trigger {
    pub source: TriggerSource,
    pub kind: TriggerKind,
}

impl Trigger {
    pub fn new(source: TriggerSource, kind: TriggerKind) -> Self {
        Self { source, kind }
    }

    pub fn unload() -> Self {
        Self::new(TriggerSource::Window, TriggerKind::Unload)
    }

    pub fn click(element_id: impl Into<String>) -> Self {
        Self::new(
            TriggerSource::Element(ElementRef::new(element_id)),
            TriggerKind::Click,
        )
    }

    pub fn control(control: Control) -> Self {
        Self::click(control.element_id())
    }

    pub fn matches(&self, source: &TriggerSource, kind: TriggerKind) -> bool {
        self.kind == kind && &self.source == source
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source, self.kind) {
            (TriggerSource::Window, TriggerKind::Unload) => f.write_str(UNLOAD_NAME),
            (TriggerSource::Window, TriggerKind::Click) => f.write_str("window:click"),
            (TriggerSource::Element(element), TriggerKind::Click) => write!(f, "{element}"),
            (TriggerSource::Element(element), TriggerKind::Unload) => {
                write!(f, "{element}:unload")
            }
        }
    }
}

impl FromStr for Trigger {
    type Err = PiineError;

    /// Parses the short names used in trigger scripts: a control element id
    /// such as `add-user`, or `unload`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim();
        if name.eq_ignore_ascii_case(UNLOAD_NAME) {
            return Ok(Self::unload());
        }
        Control::from_element_id(name)
            .map(Self::control)
            .ok_or_else(|| PiineError::UnknownTrigger {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_names_and_unload() {
        assert_eq!(
            "add-user".parse::<Trigger>().expect("add-user"),
            Trigger::control(Control::AddUser)
        );
        assert_eq!(" UNLOAD ".parse::<Trigger>().expect("unload"), Trigger::unload());
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "piine-view".parse::<Trigger>().expect_err("not a trigger");
        assert_eq!(
            err,
            PiineError::UnknownTrigger {
                name: "piine-view".into()
            }
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn display_matches_script_names() {
        assert_eq!(Trigger::control(Control::Ovation).to_string(), "ovation");
        assert_eq!(Trigger::unload().to_string(), "unload");
    }

    #[test]
    fn matches_requires_same_source_and_kind() {
        let click = Trigger::click("add-user");
        let source = TriggerSource::Element(ElementRef::new("add-user"));
        assert!(click.matches(&source, TriggerKind::Click));
        assert!(!click.matches(&source, TriggerKind::Unload));
        assert!(!click.matches(&TriggerSource::Window, TriggerKind::Click));
    }
}
