use iced::widget::{button, column, horizontal_space, pick_list, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};

use super::cover_thumbnail;
use crate::state::data::Genre;
use crate::state::form::EditForm;
use crate::Message;

const PREVIEW_SIZE: f32 = 96.0;

/// The add/edit form
pub fn view(form: &EditForm) -> Element<'_, Message> {
    let mut header = row![
        button("Back").on_press(Message::Cancel).style(button::text),
        text(form.heading()).size(28),
        horizontal_space(),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    if form.can_delete() {
        header = header.push(
            button("Delete")
                .on_press(Message::DeleteEditing)
                .style(button::danger),
        );
    }

    let mut cover_actions = column![button("Choose image").on_press(Message::ChooseCover)].spacing(8);
    if !form.cover_image.is_empty() {
        cover_actions = cover_actions.push(
            button("Remove cover")
                .on_press(Message::RemoveCover)
                .style(button::secondary),
        );
    }

    let fields = column![
        labelled(
            "Title",
            text_input("Title", &form.title)
                .on_input(Message::TitleChanged)
                .padding(8),
        ),
        labelled(
            "Developer",
            text_input("Developer", &form.developer)
                .on_input(Message::DeveloperChanged)
                .padding(8),
        ),
        labelled(
            "Genre",
            pick_list(Genre::ALL, Some(form.genre), Message::GenreSelected).width(Length::Fill),
        ),
        labelled(
            "Release date",
            text_input("YYYY-MM-DD", &form.release_date)
                .on_input(Message::ReleaseDateChanged)
                .padding(8),
        ),
        row![cover_thumbnail(&form.cover_image, PREVIEW_SIZE), cover_actions]
            .spacing(12)
            .align_y(Alignment::Center),
        button("Save").on_press(Message::Save).padding(10),
    ]
    .spacing(12);

    column![header, scrollable(fields).height(Length::Fill)]
        .spacing(20)
        .padding(24)
        .into()
}

fn labelled<'a>(label: &'a str, input: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    column![text(label).size(14), input.into()].spacing(4).into()
}
