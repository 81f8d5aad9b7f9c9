//! The UI contract.
//!
//! The kernel hands the UI a [`MenuModel`] — interactions grouped by
//! subject, system actions, navigation targets — and receives back one
//! opaque [`UiSelection`].  Nothing here assumes a textual rendering; keys
//! are stable strings an interface echoes back verbatim.

use cw_core::{ActorId, PlaceId, RoadId};

/// One actionable interaction in the menu.
#[derive(Clone, Debug)]
pub struct MenuItem {
    /// Opaque selection key, echoed back via [`UiSelection::key`].
    pub key: String,
    pub label: String,
    /// `Some(reason)` renders the item greyed out.
    pub disabled: Option<&'static str>,
}

/// All interactions available toward one co-located actor.
#[derive(Clone, Debug)]
pub struct SubjectMenu {
    pub subject: ActorId,
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// Kernel-provided system actions.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SystemAction {
    Save,
    Inspect,
    Quit,
}

impl SystemAction {
    pub fn key(self) -> &'static str {
        match self {
            SystemAction::Save => "save",
            SystemAction::Inspect => "inspect",
            SystemAction::Quit => "quit",
        }
    }
}

/// A road the player could depart on.
#[derive(Clone, Debug)]
pub struct NavTarget {
    pub key: String,
    pub road: RoadId,
    pub to: PlaceId,
    pub to_name: String,
    pub length_km: f64,
}

/// What the kernel shows the player at a suspension point.
#[derive(Clone, Debug)]
pub struct MenuModel {
    pub place: PlaceId,
    pub place_name: String,
    pub subjects: Vec<SubjectMenu>,
    pub system: Vec<SystemAction>,
    pub navigation: Vec<NavTarget>,
}

/// The player's answer: one key from the model plus a free-form argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiSelection {
    pub key: String,
    pub argument: String,
}

impl UiSelection {
    pub fn pass() -> Self {
        UiSelection {
            key: "pass".into(),
            argument: String::new(),
        }
    }
}

/// The UI collaborator.  `choose` may block; `flush` is the explicit
/// render boundary between dispatches.
pub trait UiBridge {
    fn choose(&mut self, menu: &MenuModel) -> UiSelection;

    fn flush(&mut self) {}
}

/// A bridge that never interacts: every menu passes.
pub struct HeadlessUi;

impl UiBridge for HeadlessUi {
    fn choose(&mut self, _menu: &MenuModel) -> UiSelection {
        UiSelection::pass()
    }
}
