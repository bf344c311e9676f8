// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for CAD data representation
//!
//! This module defines the fundamental types shared by the readers, the mesher
//! and the HTTP layer: STEP entity values, source formats and the GPU-ready
//! mesh output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Type-safe entity identifier
///
/// Wraps the raw STEP instance name (e.g., #123 becomes EntityId(123)) or an
/// IGES directory entry sequence number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// STEP entity type enumeration
///
/// Covers the topology and geometry entities the built-in kernel understands.
/// Everything else is captured with its original (upper-cased) name.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    // ========================================================================
    // Geometry
    // ========================================================================
    CartesianPoint,
    Direction,
    Axis2Placement3d,
    Plane,
    CylindricalSurface,
    Line,
    Circle,
    Polyline,

    // ========================================================================
    // Topology
    // ========================================================================
    VertexPoint,
    EdgeCurve,
    OrientedEdge,
    EdgeLoop,
    PolyLoop,
    FaceBound,
    FaceOuterBound,
    AdvancedFace,
    FaceSurface,
    ClosedShell,
    OpenShell,

    // ========================================================================
    // Solids and surface models
    // ========================================================================
    ManifoldSolidBrep,
    FacetedBrep,
    BrepWithVoids,
    ShellBasedSurfaceModel,

    // ========================================================================
    // Tessellated geometry (AP242)
    // ========================================================================
    CoordinatesList,
    TriangulatedFace,
    TessellatedShell,
    TessellatedSolid,

    /// Unknown type - stores the original type name string
    Unknown(String),
}

impl FromStr for StepType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl StepType {
    /// Parse a type name string into a StepType
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CARTESIAN_POINT" => StepType::CartesianPoint,
            "DIRECTION" => StepType::Direction,
            "AXIS2_PLACEMENT_3D" => StepType::Axis2Placement3d,
            "PLANE" => StepType::Plane,
            "CYLINDRICAL_SURFACE" => StepType::CylindricalSurface,
            "LINE" => StepType::Line,
            "CIRCLE" => StepType::Circle,
            "POLYLINE" => StepType::Polyline,
            "VERTEX_POINT" => StepType::VertexPoint,
            "EDGE_CURVE" => StepType::EdgeCurve,
            "ORIENTED_EDGE" => StepType::OrientedEdge,
            "EDGE_LOOP" => StepType::EdgeLoop,
            "POLY_LOOP" => StepType::PolyLoop,
            "FACE_BOUND" => StepType::FaceBound,
            "FACE_OUTER_BOUND" => StepType::FaceOuterBound,
            "ADVANCED_FACE" => StepType::AdvancedFace,
            "FACE_SURFACE" => StepType::FaceSurface,
            "CLOSED_SHELL" => StepType::ClosedShell,
            "OPEN_SHELL" => StepType::OpenShell,
            "MANIFOLD_SOLID_BREP" => StepType::ManifoldSolidBrep,
            "FACETED_BREP" => StepType::FacetedBrep,
            "BREP_WITH_VOIDS" => StepType::BrepWithVoids,
            "SHELL_BASED_SURFACE_MODEL" => StepType::ShellBasedSurfaceModel,
            "COORDINATES_LIST" => StepType::CoordinatesList,
            "TRIANGULATED_FACE" => StepType::TriangulatedFace,
            "TESSELLATED_SHELL" => StepType::TessellatedShell,
            "TESSELLATED_SOLID" => StepType::TessellatedSolid,
            other => StepType::Unknown(other.to_string()),
        }
    }

    /// Get the type name as written in a Part 21 file
    pub fn name(&self) -> &str {
        match self {
            StepType::CartesianPoint => "CARTESIAN_POINT",
            StepType::Direction => "DIRECTION",
            StepType::Axis2Placement3d => "AXIS2_PLACEMENT_3D",
            StepType::Plane => "PLANE",
            StepType::CylindricalSurface => "CYLINDRICAL_SURFACE",
            StepType::Line => "LINE",
            StepType::Circle => "CIRCLE",
            StepType::Polyline => "POLYLINE",
            StepType::VertexPoint => "VERTEX_POINT",
            StepType::EdgeCurve => "EDGE_CURVE",
            StepType::OrientedEdge => "ORIENTED_EDGE",
            StepType::EdgeLoop => "EDGE_LOOP",
            StepType::PolyLoop => "POLY_LOOP",
            StepType::FaceBound => "FACE_BOUND",
            StepType::FaceOuterBound => "FACE_OUTER_BOUND",
            StepType::AdvancedFace => "ADVANCED_FACE",
            StepType::FaceSurface => "FACE_SURFACE",
            StepType::ClosedShell => "CLOSED_SHELL",
            StepType::OpenShell => "OPEN_SHELL",
            StepType::ManifoldSolidBrep => "MANIFOLD_SOLID_BREP",
            StepType::FacetedBrep => "FACETED_BREP",
            StepType::BrepWithVoids => "BREP_WITH_VOIDS",
            StepType::ShellBasedSurfaceModel => "SHELL_BASED_SURFACE_MODEL",
            StepType::CoordinatesList => "COORDINATES_LIST",
            StepType::TriangulatedFace => "TRIANGULATED_FACE",
            StepType::TessellatedShell => "TESSELLATED_SHELL",
            StepType::TessellatedSolid => "TESSELLATED_SOLID",
            StepType::Unknown(s) => s,
        }
    }

    /// Check if this type is a face that can be meshed
    pub fn is_face(&self) -> bool {
        matches!(
            self,
            StepType::AdvancedFace | StepType::FaceSurface | StepType::TriangulatedFace
        )
    }
}

impl Default for StepType {
    fn default() -> Self {
        StepType::Unknown(String::new())
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decoded attribute value
///
/// Represents any value that can appear in a STEP entity's attribute list.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    /// Null value ($)
    #[default]
    Null,
    /// Derived value (*)
    Derived,
    /// Entity reference (#123)
    EntityRef(EntityId),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Enumeration value (.VALUE.)
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value like LENGTH_MEASURE(2.5)
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    /// Try to get as entity reference
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_string(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::TypedValue(_, args) if !args.is_empty() => args[0].as_float(),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as boolean (STEP logicals are .T. / .F.)
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Enum(s) => match s.to_uppercase().as_str() {
                "TRUE" | "T" => Some(true),
                "FALSE" | "F" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to read a list of floats, e.g. the coordinates of a point
    pub fn as_float_list(&self) -> Option<Vec<f64>> {
        self.as_list()
            .map(|items| items.iter().filter_map(|v| v.as_float()).collect())
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// Decoded STEP entity
///
/// Represents a fully decoded entity instance with its ID, type, and
/// attribute values.
#[derive(Clone, Debug)]
pub struct DecodedEntity {
    /// Entity ID
    pub id: EntityId,
    /// Entity type
    pub step_type: StepType,
    /// Attribute values in order
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    /// Get attribute at index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference at index
    pub fn get_ref(&self, index: usize) -> Option<EntityId> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get float at index
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    /// Get list at index
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// Get boolean at index
    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(|v| v.as_bool())
    }
}

/// File extensions accepted by the converter
pub const SUPPORTED_EXTENSIONS: [&str; 4] = [".step", ".stp", ".iges", ".igs"];

/// Source CAD exchange format
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CadFormat {
    /// ISO 10303-21 (.step, .stp)
    Step,
    /// Initial Graphics Exchange Specification (.iges, .igs)
    Iges,
}

impl CadFormat {
    /// Resolve a format from an extension, with or without the leading dot
    ///
    /// Matching is case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "step" | "stp" => Some(CadFormat::Step),
            "iges" | "igs" => Some(CadFormat::Iges),
            _ => None,
        }
    }

    /// Format tag reported in conversion metadata
    pub fn tag(&self) -> &'static str {
        match self {
            CadFormat::Step => "STEP",
            CadFormat::Iges => "IGES",
        }
    }
}

impl fmt::Display for CadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Lower-cased extension of a file name including the dot (".step")
///
/// Returns an empty string when the name has no extension.
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Default RGB color for converted meshes (light gray/silver)
pub const DEFAULT_MESH_COLOR: [f32; 3] = [0.7, 0.7, 0.75];

/// GPU-ready mesh data
///
/// Contains flattened vertex data suitable for direct upload to a vertex
/// buffer. Serialized as-is in the `/convert` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Display name of the part
    pub name: String,
    /// Vertex positions as flattened [x, y, z, x, y, z, ...]
    pub vertices: Vec<f32>,
    /// Vertex normals as flattened [nx, ny, nz, nx, ny, nz, ...]
    pub normals: Vec<f32>,
    /// Triangle indices (0-based)
    pub indices: Vec<u32>,
    /// RGB color, each channel in 0.0-1.0
    pub color: [f32; 3],
}

impl MeshData {
    /// Create a new empty mesh with the default color
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            color: DEFAULT_MESH_COLOR,
        }
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Metadata about one conversion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    /// Number of meshes produced
    pub part_count: usize,
    /// Total vertices across all meshes
    pub vertex_count: usize,
    /// Total triangles across all meshes
    pub face_count: usize,
    /// Source format tag ("STEP" or "IGES")
    pub format: String,
    /// Original upload file name
    pub file_name: String,
}

impl ConversionMetadata {
    /// Aggregate counts over the produced meshes
    pub fn from_meshes(
        meshes: &[MeshData],
        format: CadFormat,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            part_count: meshes.len(),
            vertex_count: meshes.iter().map(MeshData::vertex_count).sum(),
            face_count: meshes.iter().map(MeshData::triangle_count).sum(),
            format: format.tag().to_string(),
            file_name: file_name.into(),
        }
    }
}

/// Model metadata extracted from a file header
#[derive(Clone, Debug, Default)]
pub struct ModelMetadata {
    /// Schema name (e.g., "AUTOMOTIVE_DESIGN", "CONFIG_CONTROL_DESIGN")
    pub schema: String,
    /// File name from header
    pub file_name: Option<String>,
    /// Originating system (CAD application)
    pub originating_system: Option<String>,
    /// Preprocessor version
    pub preprocessor_version: Option<String>,
    /// Timestamp
    pub timestamp: Option<String>,
}
