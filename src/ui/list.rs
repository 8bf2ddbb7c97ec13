use iced::widget::{button, column, container, horizontal_space, row, scrollable, text, Column};
use iced::{Alignment, Element, Length};

use super::cover_thumbnail;
use crate::state::data::GameRecord;
use crate::state::form::DATE_FORMAT;
use crate::Message;

const THUMB_SIZE: f32 = 56.0;

/// The catalogue screen
pub fn view(games: &[GameRecord]) -> Element<'_, Message> {
    let header = row![
        text("Game Shelf").size(32),
        horizontal_space(),
        button("Add Game")
            .on_press(Message::AddPressed)
            .padding(10),
    ]
    .align_y(Alignment::Center);

    let body: Element<Message> = if games.is_empty() {
        container(text("No games yet. Press Add Game to start.").size(18))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    } else {
        let rows = Column::with_children(games.iter().map(game_row))
            .spacing(8)
            .width(Length::Fill);
        scrollable(rows).height(Length::Fill).into()
    };

    column![header, body]
        .spacing(20)
        .padding(24)
        .into()
}

fn game_row(game: &GameRecord) -> Element<'_, Message> {
    let details = column![
        text(&game.title).size(18),
        text(format!("{}  •  {}", game.developer, game.genre)).size(14),
        text(game.release_date.format(DATE_FORMAT).to_string()).size(12),
    ]
    .spacing(2);

    let summary = row![cover_thumbnail(&game.cover_image, THUMB_SIZE), details]
        .spacing(12)
        .align_y(Alignment::Center);

    row![
        button(summary)
            .on_press(Message::EditPressed(game.clone()))
            .style(button::secondary)
            .width(Length::Fill)
            .padding(8),
        button("Delete")
            .on_press(Message::DeletePressed(game.clone()))
            .style(button::danger)
            .padding(8),
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}
