//! The role book: role identifier → component recipe.
//!
//! Components are never serialized; a save carries only the role string,
//! and restore re-attaches components by looking the role up here.  The
//! mapping is collaborator-defined — applications may register their own
//! recipes on top of the standard table.

use cw_actor::{Actor, Component};
use cw_core::TimeDuration;
use rustc_hash::FxHashMap;
use tracing::warn;

type Recipe = fn(&mut Actor);

/// Role → component recipe registry.
pub struct RoleBook {
    recipes: FxHashMap<String, Recipe>,
}

impl RoleBook {
    /// The standard table.
    pub fn standard() -> Self {
        let mut book = RoleBook {
            recipes: FxHashMap::default(),
        };
        book.register("wanderer", |a| {
            a.attach(Component::trader(0.5));
            a.attach(Component::nomad(1.0));
            a.attach(Component::idler(TimeDuration::hours(1)));
        });
        book.register("drifter", |a| {
            a.attach(Component::trader(0.5));
            a.attach(Component::nomad(1.0));
            a.attach(Component::idler(TimeDuration::hours(1)));
        });
        book.register("freighter", |a| {
            a.attach(Component::trader(0.9));
            a.attach(Component::nomad(0.5));
            a.attach(Component::idler(TimeDuration::hours(2)));
        });
        book.register("bandit", |a| {
            a.attach(Component::raider(0.4));
            a.attach(Component::nomad(0.75));
            a.attach(Component::idler(TimeDuration::hours(1)));
        });
        book.register("settlement", |a| {
            a.attach(Component::trader(0.25));
            a.attach(Component::idler(TimeDuration::hours(6)));
        });
        book
    }

    /// Register (or replace) a recipe.
    pub fn register(&mut self, role: impl Into<String>, recipe: Recipe) {
        self.recipes.insert(role.into(), recipe);
    }

    /// Attach the role's components to `actor`.  Unknown roles get the
    /// bare idler so the actor still wakes.
    pub fn outfit(&self, role: &str, actor: &mut Actor) {
        match self.recipes.get(role) {
            Some(recipe) => recipe(actor),
            None => {
                warn!(role, actor = %actor.name, "unknown role, attaching idler only");
                actor.attach(Component::idler(TimeDuration::hours(1)));
            }
        }
    }

    pub fn knows(&self, role: &str) -> bool {
        self.recipes.contains_key(role)
    }
}

impl Default for RoleBook {
    fn default() -> Self {
        RoleBook::standard()
    }
}
