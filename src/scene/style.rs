use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// The built-in house styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleSelection {
    BubbleWrap,
    Cinnabar,
    Refill,
    Walkabout,
    Zinc,
}

impl StyleSelection {
    pub const ALL: [StyleSelection; 5] = [
        Self::BubbleWrap,
        Self::Cinnabar,
        Self::Refill,
        Self::Walkabout,
        Self::Zinc,
    ];

    /// Scene file bundled for this style
    pub fn file_name(self) -> &'static str {
        match self {
            Self::BubbleWrap => "bubble-wrap-style-more-labels.yaml",
            Self::Cinnabar => "cinnabar-style-more-labels.yaml",
            Self::Refill => "refill-style-more-labels.yaml",
            Self::Walkabout => "walkabout-style-more-labels.yaml",
            Self::Zinc => "zinc-style-more-labels.yaml",
        }
    }
}

impl std::fmt::Display for StyleSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BubbleWrap => write!(f, "bubble-wrap"),
            Self::Cinnabar => write!(f, "cinnabar"),
            Self::Refill => write!(f, "refill"),
            Self::Walkabout => write!(f, "walkabout"),
            Self::Zinc => write!(f, "zinc"),
        }
    }
}

/// Callback fired once the requested style finished loading
pub type OnStyleLoaded = Box<dyn FnOnce(StyleSelection)>;

/// The single outstanding asynchronous style load.
///
/// A newer load replaces the slot; a completion only fires the callback
/// when its file name matches the latest request.
#[derive(Default)]
pub struct PendingStyleLoad {
    slot: Option<(StyleSelection, Option<OnStyleLoaded>)>,
}

impl PendingStyleLoad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new request, dropping whatever was pending before
    pub fn replace(&mut self, style: StyleSelection, callback: Option<OnStyleLoaded>) {
        if let Some((previous, _)) = self.slot.replace((style, callback)) {
            log::debug!("style load {} superseded by {}", previous, style);
        }
    }

    /// Style of the outstanding request, if any
    pub fn pending_style(&self) -> Option<StyleSelection> {
        self.slot.as_ref().map(|(style, _)| *style)
    }

    /// Fires and clears the stored callback if `file_name` matches the latest request.
    ///
    /// Returns whether the notification matched.
    pub fn complete(&mut self, file_name: &str) -> bool {
        let matches = self
            .slot
            .as_ref()
            .is_some_and(|(style, _)| style.file_name() == file_name);
        if !matches {
            return false;
        }

        if let Some((style, callback)) = self.slot.take() {
            if let Some(callback) = callback {
                callback(style);
            }
        }
        true
    }
}

impl std::fmt::Debug for PendingStyleLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingStyleLoad")
            .field("pending_style", &self.pending_style())
            .finish()
    }
}

/// Future resolving when an asynchronous style load completes.
///
/// Resolves to `Err(Canceled)` if another load supersedes this one first.
#[derive(Debug)]
pub struct StyleLoadNotifier {
    receiver: oneshot::Receiver<StyleSelection>,
}

impl StyleLoadNotifier {
    /// Builds the notifier together with the callback to store in [`PendingStyleLoad`]
    pub fn channel() -> (OnStyleLoaded, Self) {
        let (sender, receiver) = oneshot::channel();
        let callback: OnStyleLoaded = Box::new(move |style| {
            // The receiver may already be gone; nobody is waiting then
            let _ = sender.send(style);
        });
        (callback, Self { receiver })
    }
}

impl Future for StyleLoadNotifier {
    type Output = Result<StyleSelection, oneshot::Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx)
    }
}
