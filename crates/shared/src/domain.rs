use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident, $repr:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $repr);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(ParticipantId, u32);
id_newtype!(OvationId, u64);

/// Element id of the surface the view port mounts into.
pub const VIEW_ID: &str = "piine-view";

/// A resolved reference to an element on the host surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The UI controls the app listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    AddUser,
    RemoveUser,
    ReactUser,
    Ovation,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::AddUser,
        Control::RemoveUser,
        Control::ReactUser,
        Control::Ovation,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Control::AddUser => "add-user",
            Control::RemoveUser => "remove-user",
            Control::ReactUser => "react-user",
            Control::Ovation => "ovation",
        }
    }

    pub fn from_element_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|control| control.element_id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_ids_round_trip_through_element_ids() {
        for control in Control::ALL {
            assert_eq!(Control::from_element_id(control.element_id()), Some(control));
        }
        assert_eq!(Control::from_element_id(VIEW_ID), None);
    }

    #[test]
    fn control_serializes_as_element_id() {
        let json = serde_json::to_string(&Control::RemoveUser).expect("serialize");
        assert_eq!(json, "\"remove-user\"");
    }
}
