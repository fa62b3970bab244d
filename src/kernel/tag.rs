use std::fmt;
use std::num::NonZeroU32;

macro_rules! kernel_tag {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a raw kernel tag; the null tag `0` yields `None`.
            #[must_use]
            pub fn new(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            /// Returns the raw kernel tag.
            #[must_use]
            pub fn raw(self) -> u32 {
                self.0.get()
            }
        }

        impl From<NonZeroU32> for $name {
            fn from(raw: NonZeroU32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

kernel_tag! {
    /// Session-scoped tag of a solid-kernel body.
    BodyTag
}

kernel_tag! {
    /// Session-scoped tag of a solid-kernel face.
    FaceTag
}

kernel_tag! {
    /// Session-scoped tag of a solid-kernel edge.
    EdgeTag
}

/// Tag of a face or edge inside a kernel body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubTag {
    Face(FaceTag),
    Edge(EdgeTag),
}

impl SubTag {
    /// Returns the raw kernel tag.
    #[must_use]
    pub fn raw(self) -> u32 {
        match self {
            SubTag::Face(tag) => tag.raw(),
            SubTag::Edge(tag) => tag.raw(),
        }
    }
}
