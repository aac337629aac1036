/// Net change of the face set caused by adding half-spaces.
///
/// Deltas compose with [`FaceDelta::merge`]; composing the per-step deltas of
/// a batch yields the difference between the face sets before and after the
/// whole batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDelta<F> {
    added: Vec<F>,
    dropped: Vec<F>,
}

impl<F> Default for FaceDelta<F> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            dropped: Vec::new(),
        }
    }
}

impl<F: PartialEq> FaceDelta<F> {
    /// Creates an empty delta.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a delta that only drops the given faces.
    #[must_use]
    pub fn dropping(faces: Vec<F>) -> Self {
        Self {
            added: Vec::new(),
            dropped: faces,
        }
    }

    /// Faces present after the change but not before.
    #[must_use]
    pub fn added(&self) -> &[F] {
        &self.added
    }

    /// Faces present before the change but not after.
    #[must_use]
    pub fn dropped(&self) -> &[F] {
        &self.dropped
    }

    /// Returns `true` if the face set did not change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.dropped.is_empty()
    }

    /// Records that `face` was added, cancelling an earlier drop of it.
    pub fn push_added(&mut self, face: F) {
        if let Some(pos) = self.dropped.iter().position(|f| *f == face) {
            self.dropped.remove(pos);
        } else if !self.added.contains(&face) {
            self.added.push(face);
        }
    }

    /// Records that `face` was dropped, cancelling an earlier add of it.
    pub fn push_dropped(&mut self, face: F) {
        if let Some(pos) = self.added.iter().position(|f| *f == face) {
            self.added.remove(pos);
        } else if !self.dropped.contains(&face) {
            self.dropped.push(face);
        }
    }

    /// Composes `self` followed by `later`.
    ///
    /// Drops of `later` are applied before its adds, so a face replaced in
    /// place within one step nets out correctly.
    #[must_use]
    pub fn merge(mut self, later: Self) -> Self {
        for face in later.dropped {
            self.push_dropped(face);
        }
        for face in later.added {
            self.push_added(face);
        }
        self
    }

}

/// Outcome of [`BrushGeometry::add_faces`](super::BrushGeometry::add_faces).
#[derive(Debug, Clone, PartialEq)]
pub enum AddFaceResult<F> {
    /// The brush was cut; carries the net face delta of the call.
    Split(FaceDelta<F>),
    /// The brush has no volume left and is now empty. The delta drops every
    /// face the brush had before the call.
    BrushIsNull(FaceDelta<F>),
    /// No half-space changed the brush; their faces should be discarded.
    FaceIsRedundant,
}

impl<F> AddFaceResult<F> {
    #[must_use]
    pub fn is_split(&self) -> bool {
        matches!(self, Self::Split(_))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::BrushIsNull(_))
    }

    #[must_use]
    pub fn is_redundant(&self) -> bool {
        matches!(self, Self::FaceIsRedundant)
    }

    /// The face delta, if the call changed anything.
    #[must_use]
    pub fn delta(&self) -> Option<&FaceDelta<F>> {
        match self {
            Self::Split(delta) | Self::BrushIsNull(delta) => Some(delta),
            Self::FaceIsRedundant => None,
        }
    }
}
