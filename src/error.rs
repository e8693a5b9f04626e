use taffy::TaffyError;

use crate::selector;

#[derive(Debug)]
pub enum PageError {
    Layout(TaffyError),
    Selector(selector::SelectorError),
    BodyNotFound,
    ElementNotFound,
    ContextNotFound,
}

impl From<TaffyError> for PageError {
    fn from(error: TaffyError) -> Self {
        PageError::Layout(error)
    }
}

impl From<selector::SelectorError> for PageError {
    fn from(error: selector::SelectorError) -> Self {
        PageError::Selector(error)
    }
}
