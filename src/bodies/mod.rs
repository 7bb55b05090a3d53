mod body;
mod kind;

pub use self::body::Body;
pub use self::kind::BodyKind;

/// Flags for controlling body behavior
pub mod body_flags {
    use bitflags::bitflags;

    bitflags! {
        /// Flags for controlling how a body participates in collision processing
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct BodyFlags: u32 {
            /// Body participates in collision detection
            const COLLIDABLE = 0x01;

            /// Body generates internal elastic constraints from its topology
            const GENERATE_CONSTRAINTS = 0x02;
        }
    }
}
