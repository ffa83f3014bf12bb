//! Blend shapes (morph targets) attached to a mesh.
//!
//! A [`BlendShapeLibrary`] holds named [`BlendShape`]s. Each shape is an
//! ordered list of [`BlendShapeFrame`]s as authored; a frame pairs a blend
//! weight with per-vertex position, normal, and tangent deltas that are
//! index-aligned with the base mesh vertices.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One weighted frame of a blend shape.
///
/// The three delta arrays are parallel: entry `i` of each refers to base
/// vertex `i`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlendShapeFrame {
    /// Blend weight at which this frame is fully applied.
    pub weight: f64,
    /// Per-vertex position offsets.
    pub position_deltas: Vec<Vector3<f64>>,
    /// Per-vertex normal offsets.
    pub normal_deltas: Vec<Vector3<f64>>,
    /// Per-vertex tangent offsets.
    pub tangent_deltas: Vec<Vector3<f64>>,
}

impl BlendShapeFrame {
    /// Create a frame from all three delta arrays.
    #[must_use]
    pub const fn new(
        weight: f64,
        position_deltas: Vec<Vector3<f64>>,
        normal_deltas: Vec<Vector3<f64>>,
        tangent_deltas: Vec<Vector3<f64>>,
    ) -> Self {
        Self {
            weight,
            position_deltas,
            normal_deltas,
            tangent_deltas,
        }
    }

    /// Create a frame with position deltas and zero normal/tangent deltas.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{BlendShapeFrame, Vector3};
    ///
    /// let frame = BlendShapeFrame::from_positions(100.0, vec![Vector3::x(); 4]);
    /// assert_eq!(frame.vertex_count(), 4);
    /// assert_eq!(frame.normal_deltas.len(), 4);
    /// ```
    #[must_use]
    pub fn from_positions(weight: f64, position_deltas: Vec<Vector3<f64>>) -> Self {
        let n = position_deltas.len();
        Self {
            weight,
            position_deltas,
            normal_deltas: vec![Vector3::zeros(); n],
            tangent_deltas: vec![Vector3::zeros(); n],
        }
    }

    /// Number of vertices addressed by the position deltas.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.position_deltas.len()
    }

    /// Check that every delta array addresses exactly `vertex_count` vertices.
    #[must_use]
    pub fn is_consistent_with(&self, vertex_count: usize) -> bool {
        self.position_deltas.len() == vertex_count
            && self.normal_deltas.len() == vertex_count
            && self.tangent_deltas.len() == vertex_count
    }
}

/// A named blend shape with its frames in authored order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlendShape {
    /// Shape name, unique within a library.
    pub name: String,
    /// Frames in authored order.
    pub frames: Vec<BlendShapeFrame>,
}

impl BlendShape {
    /// Create an empty shape.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    /// Number of frames.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// The blend-shape library of a mesh.
///
/// # Example
///
/// ```
/// use mesh_types::{BlendShapeFrame, BlendShapeLibrary, Vector3};
///
/// let mut library = BlendShapeLibrary::new();
/// library.push_frame("Smile", BlendShapeFrame::from_positions(50.0, vec![Vector3::y(); 2]));
/// library.push_frame("Smile", BlendShapeFrame::from_positions(100.0, vec![Vector3::y(); 2]));
/// library.push_frame("Blink", BlendShapeFrame::from_positions(100.0, vec![Vector3::z(); 2]));
///
/// assert_eq!(library.len(), 2);
/// assert_eq!(library.get("Smile").map(|s| s.frame_count()), Some(2));
/// assert_eq!(library.frame_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlendShapeLibrary {
    shapes: Vec<BlendShape>,
}

impl BlendShapeLibrary {
    /// Create an empty library.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Append a frame to the named shape, creating the shape on first use.
    ///
    /// Shapes keep the order in which they were first added.
    pub fn push_frame(&mut self, name: &str, frame: BlendShapeFrame) {
        if let Some(shape) = self.shapes.iter_mut().find(|s| s.name == name) {
            shape.frames.push(frame);
        } else {
            let mut shape = BlendShape::new(name);
            shape.frames.push(frame);
            self.shapes.push(shape);
        }
    }

    /// Append a complete shape.
    pub fn push_shape(&mut self, shape: BlendShape) {
        self.shapes.push(shape);
    }

    /// Look up a shape by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BlendShape> {
        self.shapes.iter().find(|s| s.name == name)
    }

    /// All shapes in library order.
    #[inline]
    #[must_use]
    pub fn shapes(&self) -> &[BlendShape] {
        &self.shapes
    }

    /// Iterate over shapes in library order.
    pub fn iter(&self) -> impl Iterator<Item = &BlendShape> {
        self.shapes.iter()
    }

    /// Number of shapes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the library has no shapes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Total number of frames across all shapes.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.shapes.iter().map(BlendShape::frame_count).sum()
    }

    /// Remove every shape.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl<'a> IntoIterator for &'a BlendShapeLibrary {
    type Item = &'a BlendShape;
    type IntoIter = std::slice::Iter<'a, BlendShape>;

    fn into_iter(self) -> Self::IntoIter {
        self.shapes.iter()
    }
}
