/// UI views for the two screens
///
/// - `list.rs`: the catalogue with per-row edit and delete
/// - `edit.rs`: the add/edit form
use iced::widget::image::Handle;
use iced::widget::{container, text, Image};
use iced::{Element, Length};

use crate::cover;
use crate::Message;

pub mod edit;
pub mod list;

/// Square cover preview, or a placeholder when the image is missing
pub fn cover_thumbnail<'a>(cover_image: &str, size: f32) -> Element<'a, Message> {
    let content: Element<'a, Message> = if cover::cover_exists(cover_image) {
        Image::new(Handle::from_path(cover_image))
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .into()
    } else {
        text("No cover").size(12).into()
    };

    container(content)
        .width(Length::Fixed(size))
        .height(Length::Fixed(size))
        .center_x(Length::Fixed(size))
        .center_y(Length::Fixed(size))
        .style(container::rounded_box)
        .into()
}
