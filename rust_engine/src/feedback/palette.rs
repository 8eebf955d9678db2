//! 反馈表现
//!
//! 把事件变成宿主可以直接播放的提示：随机挑一个已加载的咔哒音效，
//! 随机挑一个弹出文字（偏向与标签同名的词），再随机化颜色、字号和时长。

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::Duration;

use super::sink::EventSink;

/// 弹出文字候选
pub const POP_WORDS: [&str; 3] = ["POP", "CRACK", "SNAP"];

/// 腰部的弹出文字明显偏下（屏幕像素）
const WAIST_OFFSET_Y: f32 = 200.0;
const DEFAULT_OFFSET_Y: f32 = -16.0;

/// 一次待播放的反馈
#[derive(Clone, Debug, PartialEq)]
pub struct CrackCue {
    pub position: Vec3,
    pub label: String,
    /// 音效索引，没有加载任何音效时为 `None`
    pub sound: Option<usize>,
    pub word: &'static str,
    /// 色相（90~130，黄绿到亮绿）
    pub hue: f32,
    /// 字号（22~32 px）
    pub size: f32,
    /// 动画时长（300~500ms）
    pub duration: Duration,
    /// 投影到屏幕后的纵向偏移
    pub offset_y: f32,
}

/// 反馈表现生成器
///
/// 实现了 [`EventSink`]，生成的提示排队等待宿主取走。
#[derive(Debug)]
pub struct FeedbackPalette<R: Rng = StdRng> {
    rng: R,
    sounds: Vec<String>,
    queue: VecDeque<CrackCue>,
}

impl FeedbackPalette<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for FeedbackPalette<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> FeedbackPalette<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            sounds: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// 登记一个加载完成的音效
    pub fn add_sound(&mut self, name: impl Into<String>) -> usize {
        self.sounds.push(name.into());
        self.sounds.len() - 1
    }

    pub fn sounds(&self) -> &[String] {
        &self.sounds
    }

    pub fn sound_name(&self, index: usize) -> Option<&str> {
        self.sounds.get(index).map(String::as_str)
    }

    /// 生成一次提示（不入队）
    pub fn compose(&mut self, position: Vec3, label: &str) -> CrackCue {
        let sound = if self.sounds.is_empty() {
            None
        } else {
            Some(self.rng.gen_range(0..self.sounds.len()))
        };

        let word = self.pick_word(label);
        let hue = 90.0 + self.rng.gen::<f32>() * 40.0;
        let size = 22.0 + self.rng.gen::<f32>() * 10.0;
        let duration = Duration::from_secs_f32(0.3 + self.rng.gen::<f32>() * 0.2);
        let offset_y = if label == "waist" {
            WAIST_OFFSET_Y
        } else {
            DEFAULT_OFFSET_Y
        };

        CrackCue {
            position,
            label: label.to_string(),
            sound,
            word,
            hue,
            size,
            duration,
            offset_y,
        }
    }

    /// 标签与某个候选词同名时，该词多占一份
    fn pick_word(&mut self, label: &str) -> &'static str {
        let biased = POP_WORDS
            .iter()
            .copied()
            .find(|w| w.eq_ignore_ascii_case(label));
        let pool = POP_WORDS.len() + usize::from(biased.is_some());
        let i = self.rng.gen_range(0..pool);
        match (POP_WORDS.get(i), biased) {
            (Some(word), _) => *word,
            (None, Some(word)) => word,
            (None, None) => POP_WORDS[0],
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// 取走所有待播放的提示
    pub fn drain(&mut self) -> Vec<CrackCue> {
        self.queue.drain(..).collect()
    }
}

impl<R: Rng> EventSink for FeedbackPalette<R> {
    fn play_crack_feedback(&mut self, position: Vec3, label: &str) {
        let cue = self.compose(position, label);
        if cue.sound.is_none() {
            log::debug!("没有可用的咔哒音效，只显示文字");
        }
        self.queue.push_back(cue);
    }
}
