pub mod polygon;
pub mod surface;

pub use polygon::{Polygon, Ray};
pub use surface::{
    build_surfaces, GlazingAttributes, IdentifierAllocator, Surface, SurfaceKind, SurfaceRecord,
};
