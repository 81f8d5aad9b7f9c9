//! The bridge between place ticks and the UI collaborator.
//!
//! When the player's actor runs or re-schedules inside a tick, the place
//! calls the gate; the gate builds a [`MenuModel`] from the player's own
//! interaction enumerators, blocks on the UI, and applies the one
//! selection that comes back — all while the tick's re-entrancy guard is
//! still on, so every admission stays local to the place.

use cw_actor::{ActorStore, PlannedEvent, EventAction};
use cw_core::{ActorId, PlaceId, RoadId, TimeDuration};
use cw_interact::{Immediacy, Interaction, Proposal};
use cw_place::{EncounterGate, Place, PlaceStore};
use tracing::{debug, warn};

use crate::ui::{MenuItem, MenuModel, NavTarget, SubjectMenu, SystemAction, UiBridge, UiSelection};

pub(crate) struct BridgeGate<'a> {
    ui: &'a mut dyn UiBridge,
    places: &'a PlaceStore,
    exits: &'a [cw_actor::RoadExit],
    pub quit: bool,
    pub save: bool,
}

impl<'a> BridgeGate<'a> {
    pub fn new(
        ui: &'a mut dyn UiBridge,
        places: &'a PlaceStore,
        exits: &'a [cw_actor::RoadExit],
    ) -> Self {
        BridgeGate {
            ui,
            places,
            exits,
            quit: false,
            save: false,
        }
    }

    /// Everything the player can do right now, grouped by subject.
    fn build_menu(&self, place: &Place, actors: &ActorStore, player: ActorId) -> MenuModel {
        let mut subjects = Vec::new();
        if let Some(me) = actors.get(player) {
            for sighting in place.sightings_for(player, actors) {
                let Some(other) = actors.get(sighting.id) else {
                    continue;
                };
                let mut items = Vec::new();
                for component in &me.components {
                    for spec in component.interactions(me, &sighting) {
                        for interaction in Proposal::open(spec).interactions(me, other) {
                            let disabled = match interaction.immediacy(me, other) {
                                Immediacy::Failed(reason) => Some(reason),
                                _ => None,
                            };
                            items.push(MenuItem {
                                key: format!("act:{}:{}", sighting.id.0, interaction.key),
                                label: format!("{} · {}", interaction.key, other.name),
                                disabled,
                            });
                        }
                    }
                }
                subjects.push(SubjectMenu {
                    subject: sighting.id,
                    name: other.name.clone(),
                    items,
                });
            }
        }

        let navigation = self
            .exits
            .iter()
            .map(|exit| NavTarget {
                key: format!("nav:{}:{}", exit.road.0, exit.to.0),
                road: exit.road,
                to: exit.to,
                to_name: self
                    .places
                    .get(exit.to)
                    .map_or_else(String::new, |p| p.name.clone()),
                length_km: exit.length_km,
            })
            .collect();

        MenuModel {
            place: place.id,
            place_name: place.name.clone(),
            subjects,
            system: vec![SystemAction::Save, SystemAction::Inspect, SystemAction::Quit],
            navigation,
        }
    }

    fn apply(
        &mut self,
        selection: UiSelection,
        place: &mut Place,
        actors: &mut ActorStore,
        player: ActorId,
    ) {
        let parts: Vec<&str> = selection.key.split(':').collect();
        match parts.as_slice() {
            ["pass"] | ["inspect"] => {}
            ["quit"] => self.quit = true,
            ["save"] => self.save = true,
            ["nav", road, to] => self.apply_navigation(road, to, place, actors, player),
            ["act", subject, key] => self.apply_interaction(subject, key, place, actors, player),
            _ => warn!(key = %selection.key, "unknown ui selection"),
        }
    }

    fn apply_navigation(
        &mut self,
        road: &str,
        to: &str,
        place: &mut Place,
        actors: &mut ActorStore,
        player: ActorId,
    ) {
        let (Ok(road), Ok(to)) = (road.parse::<u32>(), to.parse::<u32>()) else {
            warn!("malformed nav selection");
            return;
        };
        let now = place.encounter_time;
        let depart = PlannedEvent::new(
            1,
            now,
            now + TimeDuration::mins(10),
            EventAction::Depart {
                road: RoadId(road),
                to: PlaceId(to),
            },
        );
        let Some(me) = actors.get_mut(player) else {
            return;
        };
        match me.set_next_event(depart) {
            Ok(true) => {
                if let Err(err) = place.reschedule(player, &depart) {
                    warn!(%err, "navigation reschedule refused");
                }
            }
            Ok(false) => debug!("navigation superseded by a standing plan"),
            Err(err) => warn!(%err, "navigation refused"),
        }
    }

    fn apply_interaction(
        &mut self,
        subject: &str,
        key: &str,
        place: &mut Place,
        actors: &mut ActorStore,
        player: ActorId,
    ) {
        let Ok(subject) = subject.parse::<u32>() else {
            warn!("malformed interaction selection");
            return;
        };
        let subject = ActorId(subject);
        let Some((me, other)) = actors.pair_mut(player, subject) else {
            debug!(%subject, "interaction subject gone");
            return;
        };

        // Re-derive the menu's interactions: the key is the contract, the
        // model may be stale.
        let sighting = other.sighting();
        let mut found: Option<Interaction> = None;
        for component in &me.components {
            for spec in component.interactions(me, &sighting) {
                for interaction in Proposal::open(spec).interactions(me, other) {
                    if interaction.key == key {
                        found = Some(interaction);
                    }
                }
            }
        }
        let Some(interaction) = found else {
            debug!(key, "selected interaction no longer offered");
            return;
        };

        match interaction.immediacy(me, other) {
            Immediacy::Failed(reason) => debug!(reason, "selected interaction disabled"),
            Immediacy::Menu | Immediacy::Immediate => {
                match interaction.perform(me, other, place.encounter_time) {
                    Ok(_) => {
                        if let Some(next) = me.next_event {
                            if let Err(err) = place.reschedule(player, &next) {
                                warn!(%err, "player reschedule refused");
                            }
                        }
                        if let Some(next) = other.next_event {
                            if let Err(err) = place.reschedule(subject, &next) {
                                warn!(%err, "subject reschedule refused");
                            }
                        }
                    }
                    Err(err) => warn!(%err, "interaction failed"),
                }
            }
        }
    }
}

impl EncounterGate for BridgeGate<'_> {
    fn player_wake(&mut self, place: &mut Place, actors: &mut ActorStore, player: ActorId) {
        let menu = self.build_menu(place, actors, player);
        let selection = self.ui.choose(&menu);
        self.apply(selection, place, actors, player);
        self.ui.flush();
    }
}
