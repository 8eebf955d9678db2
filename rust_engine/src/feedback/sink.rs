//! 反馈事件接口

use glam::Vec3;

/// 反馈事件接收端（发出即忘）
pub trait EventSink {
    /// 在世界坐标 `position` 处播放一次咔哒反馈，`label` 为链类型标签
    fn play_crack_feedback(&mut self, position: Vec3, label: &str);
}

/// 一次已发出的事件
#[derive(Clone, Debug, PartialEq)]
pub struct CrackEvent {
    pub position: Vec3,
    pub label: String,
}

/// 记录所有事件
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Vec<CrackEvent>,
}

impl RecordingSink {
    pub fn events(&self) -> &[CrackEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn play_crack_feedback(&mut self, position: Vec3, label: &str) {
        self.events.push(CrackEvent {
            position,
            label: label.to_string(),
        });
    }
}

/// 丢弃所有事件（反馈端不可用时）
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn play_crack_feedback(&mut self, _position: Vec3, _label: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::default();
        sink.play_crack_feedback(Vec3::X, "neck");
        sink.play_crack_feedback(Vec3::Y, "snap");
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.events()[1].label, "snap");
        assert_eq!(sink.events()[0].position, Vec3::X);
        sink.clear();
        assert!(sink.events().is_empty());
    }
}
