use bevy_ecs::message::Message;

/// A variant was selected and its transition started. Carries the label
/// texts for the title and price layers.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct VariantSelected {
    pub variant: String,
    pub title: String,
    pub price: String,
}
