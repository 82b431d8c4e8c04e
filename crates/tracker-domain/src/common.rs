//! Shared traits for tracker entities.

/// Exposes the document identifier assigned by the backend.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}
