mod add_body;
mod blend;
mod boolean;
mod create_solid;
mod delete_component;
mod delete_faces;
mod hollow;
mod mirror;
mod related_faces;

pub use add_body::AddBody;
pub use blend::Blend;
pub use boolean::BooleanEdit;
pub use create_solid::CreateSolid;
pub use delete_component::DeleteComponent;
pub use delete_faces::DeleteFaces;
pub use hollow::Hollow;
pub use mirror::{MirrorEdit, MirrorPlane};
pub use related_faces::FindRelatedFaces;
