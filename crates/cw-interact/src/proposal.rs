//! Proposals and their capability predicates.

use cw_actor::{Actor, ProposalSpec};
use cw_core::{ActorId, TimePoint};

use crate::exchange::ExchangeInteraction;
use crate::interaction::{Consequence, Interaction, InteractionKind};
use crate::offer::Offer;

/// A proposal: stateless but for an optional expiration.
///
/// Three predicates gate it — agent-capable, subject-capable, and
/// combination-capable; if any is false, [`interactions`][Proposal::interactions]
/// yields nothing.  Expiry is judged against the *relation's* deadline
/// field (via [`expired`][Proposal::expired]), never a global table.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Proposal {
    pub spec: ProposalSpec,
    /// [`TimePoint::UNSET`] means the proposal never expires.
    pub expiration: TimePoint,
}

impl Proposal {
    pub fn open(spec: ProposalSpec) -> Self {
        Proposal {
            spec,
            expiration: TimePoint::UNSET,
        }
    }

    pub fn until(spec: ProposalSpec, expiration: TimePoint) -> Self {
        Proposal { spec, expiration }
    }

    // ── Capability predicates ─────────────────────────────────────────────

    /// Can the agent hold up its side?
    pub fn agent_capable(&self, agent: &Actor) -> bool {
        if !agent.alive() {
            return false;
        }
        match self.spec {
            ProposalSpec::Barter { give, .. } => agent.holdings(give.0) >= give.1,
            ProposalSpec::Ultimatum { .. } => agent.offense_rating() > 0,
        }
    }

    /// Can the subject hold up its side?
    pub fn subject_capable(&self, subject: &Actor) -> bool {
        if !subject.alive() {
            return false;
        }
        match self.spec {
            ProposalSpec::Barter { take, .. } => subject.holdings(take.0) >= take.1,
            // An ultimatum's demand may exceed what the subject holds — the
            // point of a refusal path.
            ProposalSpec::Ultimatum { .. } => true,
        }
    }

    /// Is this pair in a state where the proposal makes sense?
    pub fn combination_capable(&self, agent: &Actor, subject: &Actor) -> bool {
        let outbound = agent.relation(subject.id);
        let inbound = subject.relation(agent.id);
        match self.spec {
            // No trading across an active feud.
            ProposalSpec::Barter { .. } => {
                !outbound.is_some_and(|r| r.hostile) && !inbound.is_some_and(|r| r.hostile)
            }
            // A spared subject cannot be pressed again.
            ProposalSpec::Ultimatum { .. } => !outbound.is_some_and(|r| r.is_spared()),
        }
    }

    /// `true` once the enclosing relation's deadline has passed `now`.
    pub fn expired(&self, agent: &Actor, subject: ActorId, now: TimePoint) -> bool {
        agent
            .relation(subject)
            .is_some_and(|rel| rel.deadline_expired(now))
    }

    // ── Interactions ──────────────────────────────────────────────────────

    /// The concrete interactions this proposal yields for the pair, or
    /// nothing if any capability predicate fails.
    pub fn interactions(&self, agent: &Actor, subject: &Actor) -> Vec<Interaction> {
        if !self.agent_capable(agent)
            || !self.subject_capable(subject)
            || !self.combination_capable(agent, subject)
        {
            return vec![];
        }
        match self.spec {
            ProposalSpec::Barter { give, take } => vec![Interaction {
                mechanic: agent.id,
                subject: subject.id,
                key: "barter",
                kind: InteractionKind::Exchange(ExchangeInteraction {
                    give: Offer::Goods {
                        commodity: give.0,
                        qty: give.1,
                    },
                    take: Offer::Goods {
                        commodity: take.0,
                        qty: take.1,
                    },
                }),
            }],
            ProposalSpec::Ultimatum { demand } => vec![
                // Accept: the demand changes hands, the subject is spared.
                Interaction {
                    mechanic: agent.id,
                    subject: subject.id,
                    key: "ultimatum.accept",
                    kind: InteractionKind::Exchange(ExchangeInteraction {
                        give: Offer::Spare,
                        take: Offer::Goods {
                            commodity: demand.0,
                            qty: demand.1,
                        },
                    }),
                },
                // Refuse: the pre-configured consequence lands.
                Interaction {
                    mechanic: agent.id,
                    subject: subject.id,
                    key: "ultimatum.refuse",
                    kind: InteractionKind::Refuse {
                        consequence: Consequence::Attack,
                    },
                },
            ],
        }
    }
}
