use serde::{Deserialize, Serialize};

/// Every interaction channel a host can attach a delegate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureChannel {
    Pan,
    Pinch,
    Rotate,
    Shove,
    SingleTap,
    DoubleTap,
    LongPress,
    LabelSelect,
    MarkerSelect,
    FeatureSelect,
}

impl GestureChannel {
    pub const ALL: [GestureChannel; 10] = [
        Self::Pan,
        Self::Pinch,
        Self::Rotate,
        Self::Shove,
        Self::SingleTap,
        Self::DoubleTap,
        Self::LongPress,
        Self::LabelSelect,
        Self::MarkerSelect,
        Self::FeatureSelect,
    ];

    /// The continuous gesture behind this channel, if it is one
    pub fn continuous(self) -> Option<ContinuousGesture> {
        match self {
            Self::Pan => Some(ContinuousGesture::Pan),
            Self::Pinch => Some(ContinuousGesture::Pinch),
            Self::Rotate => Some(ContinuousGesture::Rotate),
            Self::Shove => Some(ContinuousGesture::Shove),
            _ => None,
        }
    }

    /// The tap gesture behind this channel, if it is one
    pub fn tap(self) -> Option<TapGesture> {
        match self {
            Self::SingleTap => Some(TapGesture::SingleTap),
            Self::DoubleTap => Some(TapGesture::DoubleTap),
            Self::LongPress => Some(TapGesture::LongPress),
            _ => None,
        }
    }

    pub fn is_selection(self) -> bool {
        matches!(
            self,
            Self::LabelSelect | Self::MarkerSelect | Self::FeatureSelect
        )
    }
}

impl std::fmt::Display for GestureChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pan => "pan",
            Self::Pinch => "pinch",
            Self::Rotate => "rotate",
            Self::Shove => "shove",
            Self::SingleTap => "single-tap",
            Self::DoubleTap => "double-tap",
            Self::LongPress => "long-press",
            Self::LabelSelect => "label-select",
            Self::MarkerSelect => "marker-select",
            Self::FeatureSelect => "feature-select",
        };
        write!(f, "{name}")
    }
}

/// Gestures that run over several frames and carry an enable flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContinuousGesture {
    Pan,
    Pinch,
    Rotate,
    Shove,
}

impl From<ContinuousGesture> for GestureChannel {
    fn from(gesture: ContinuousGesture) -> Self {
        match gesture {
            ContinuousGesture::Pan => Self::Pan,
            ContinuousGesture::Pinch => Self::Pinch,
            ContinuousGesture::Rotate => Self::Rotate,
            ContinuousGesture::Shove => Self::Shove,
        }
    }
}

/// Discrete touch gestures that may fall back to picking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TapGesture {
    SingleTap,
    DoubleTap,
    LongPress,
}

impl From<TapGesture> for GestureChannel {
    fn from(gesture: TapGesture) -> Self {
        match gesture {
            TapGesture::SingleTap => Self::SingleTap,
            TapGesture::DoubleTap => Self::DoubleTap,
            TapGesture::LongPress => Self::LongPress,
        }
    }
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_classification_is_exhaustive() {
        for channel in GestureChannel::ALL {
            let kinds = [
                channel.continuous().is_some(),
                channel.tap().is_some(),
                channel.is_selection(),
            ];
            assert_eq!(kinds.iter().filter(|k| **k).count(), 1, "{channel}");
        }
    }

    #[test]
    fn test_typed_gestures_map_back_to_channels() {
        assert_eq!(GestureChannel::from(ContinuousGesture::Shove), GestureChannel::Shove);
        assert_eq!(GestureChannel::from(TapGesture::LongPress), GestureChannel::LongPress);
        assert_eq!(GestureChannel::Rotate.continuous(), Some(ContinuousGesture::Rotate));
        assert_eq!(GestureChannel::DoubleTap.tap(), Some(TapGesture::DoubleTap));
    }
}
