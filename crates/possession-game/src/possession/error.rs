use possession_core::BodyId;

/// Why a possession attempt was rejected.
///
/// These are advisory: the attempt is dropped and the round continues.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PossessError {
    #[error("nothing possessable under the cursor")]
    NoTarget,

    #[error("{0} is already possessed")]
    AlreadyPossessed(BodyId),

    #[error("{0} is still activating")]
    OnCooldown(BodyId),

    #[error("line of sight to {target} is blocked")]
    Obstructed {
        target: BodyId,
        /// The body in the way, or `None` for static geometry
        blocker: Option<BodyId>,
    },

    #[error("{target} is farther than {max_distance} units")]
    TooFar { target: BodyId, max_distance: f32 },

    #[error("{0} is not known to the possession controller")]
    UnknownBody(BodyId),
}
