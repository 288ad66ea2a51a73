use iced::widget::{button, center, column, container, mouse_area, opaque, row, stack, text};
use iced::{Color, Element, Length};

use crate::state::close_gate::Response;
use crate::Message;

/// A blocking message box
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Lay `content` over `base`, dimming everything behind it
pub fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| {
                container::Style {
                    background: Some(
                        Color {
                            a: 0.6,
                            ..Color::BLACK
                        }
                        .into(),
                    ),
                    ..container::Style::default()
                }
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}

fn card<'a>(
    title: &'a str,
    body: &'a str,
    buttons: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    container(
        column![text(title).size(22), text(body), buttons.into()]
            .spacing(16),
    )
    .width(Length::Fixed(440.0))
    .padding(24)
    .style(container::rounded_box)
    .into()
}

/// The unsaved-changes question
pub fn save_changes<'a>() -> Element<'a, Message> {
    let buttons = row![
        button("Cancel")
            .style(button::secondary)
            .on_press(Message::SaveChanges(Response::Cancel)),
        button("Discard")
            .style(button::danger)
            .on_press(Message::SaveChanges(Response::Discard)),
        button("Save")
            .style(button::primary)
            .on_press(Message::SaveChanges(Response::Save)),
    ]
    .spacing(10);

    card(
        "Save Changes?",
        "Open documents contain unsaved changes. Changes which are not saved will be permanently lost.",
        buttons,
    )
}

pub fn alert(alert: &Alert) -> Element<'_, Message> {
    card(
        &alert.title,
        &alert.body,
        button("OK").on_press(Message::DismissAlert),
    )
}

pub fn about<'a>() -> Element<'a, Message> {
    card(
        "gabc",
        concat!(
            "Version ",
            env!("CARGO_PKG_VERSION"),
            "\nAn editor for ABC music notation.\nDeveloped by James Watson."
        ),
        button("Close").on_press(Message::DismissAbout),
    )
}
