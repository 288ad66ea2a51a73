use iced::widget::{button, column, container, horizontal_space, row, scrollable, text, Column};
use iced::{Element, Font, Length};

use crate::state::log::{Level, LogSink};
use crate::Message;

/// Log panel: every entry, newest at the bottom, with a Clear button
pub fn view(log: &LogSink) -> Element<'_, Message> {
    let entries = Column::with_children(log.entries().iter().map(|entry| {
        let line = text(entry.render()).size(13).font(Font::MONOSPACE);
        match entry.level {
            Level::Error => line.style(text::danger).into(),
            Level::Info => line.into(),
        }
    }))
    .spacing(6);

    let header = row![
        text("Log Viewer").size(18),
        horizontal_space(),
        button("Clear").style(button::secondary).on_press(Message::ClearLog),
    ];

    container(
        column![header, scrollable(entries).anchor_bottom().height(Length::Fill)].spacing(10),
    )
    .padding(12)
    .width(Length::Fixed(380.0))
    .height(Length::Fill)
    .style(container::bordered_box)
    .into()
}
