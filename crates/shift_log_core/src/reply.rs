//! Outbound reply types handed to the messaging gateway.

/// Rows of selectable labels, rendered by the gateway in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    rows: Vec<Vec<String>>,
}

impl Keyboard {
    pub fn new<R, L>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Lays labels out two per row, preserving order.
    pub fn paired<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        Self {
            rows: labels.chunks(2).map(|pair| pair.to_vec()).collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

/// What the gateway should do with the on-screen keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReplyMarkup {
    /// Leave whatever the client shows.
    #[default]
    None,
    /// Show a one-time choice keyboard.
    Keyboard(Keyboard),
    RemoveKeyboard,
}

/// A single outbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: ReplyMarkup,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: ReplyMarkup::None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            markup: ReplyMarkup::Keyboard(keyboard),
        }
    }

    pub fn removing_keyboard(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: ReplyMarkup::RemoveKeyboard,
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match &self.markup {
            ReplyMarkup::Keyboard(k) => Some(k),
            _ => None,
        }
    }
}
