//! 每日签到与等级系统
//!
//! 每天签到一次，获得 1-50 的随机入币，经验与入币等量增加。
//! 经验达到当前等级的升级阈值时扣除阈值并升级，可以连升多级。

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use std::ops::RangeInclusive;

use crate::qqbot::error::QqBotError;
use crate::qqbot::store::UserProfile;

/// 单次签到奖励范围（闭区间）
pub const REWARD_RANGE: RangeInclusive<u64> = 1..=50;

const CELEBRATION_EMOJI: [&str; 10] = ["🎉", "✨", "🥳", "💰", "🎁", "😄", "👍", "🍀", "🌟", "🤑"];

/// 从该等级起升级阈值固定
const FLAT_THRESHOLD_LEVEL: u32 = 3;

/// 升级到下一级所需经验
pub fn threshold_for(level: u32) -> u64 {
    match level {
        0 | 1 => 100,
        2 => 1000,
        _ => 2000,
    }
}

/// 签到用的随机源
///
/// 测试中用固定种子保证结果可复现。
pub struct RewardDice {
    rng: Mcg128Xsl64,
}

impl RewardDice {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// 按配置决定是否使用固定种子
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn roll_reward(&mut self) -> u64 {
        self.rng.gen_range(REWARD_RANGE)
    }

    pub fn pick_emoji(&mut self) -> &'static str {
        CELEBRATION_EMOJI.choose(&mut self.rng).copied().unwrap_or("🎉")
    }
}

/// 一次成功签到的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInOutcome {
    pub reward: u64,
    pub level: u32,
    pub experience: u64,
    /// 新等级的升级阈值
    pub next_threshold: u64,
    pub leveled_up: bool,
    pub coins: u64,
}

impl CheckInOutcome {
    /// 生成签到回复
    pub fn render(&self, emoji: &str) -> String {
        let mut reply = format!("{} 签到成功！\n\n", emoji);
        reply.push_str(&format!("获得入币：{}\n", self.reward));
        reply.push_str(&format!("获得经验：{}\n", self.reward));
        reply.push_str(&format!("当前等级：Lv.{}\n", self.level));
        reply.push_str(&format!("当前经验：{}/{}", self.experience, self.next_threshold));
        if self.leveled_up {
            reply.push_str(&format!("\n{} 恭喜你升级啦！当前等级：Lv.{}", emoji, self.level));
        }
        reply.push_str(&format!("\n当前总入币：{}", self.coins));
        reply
    }
}

fn ensure_eligible(profile: &UserProfile, today: NaiveDate) -> Result<(), QqBotError> {
    if profile.external_account.is_none() {
        return Err(QqBotError::NotBound);
    }
    if profile.last_check_in == Some(today) {
        return Err(QqBotError::AlreadyCheckedIn);
    }
    Ok(())
}

/// 签到，奖励由 `dice` 决定
pub fn check_in(
    profile: &UserProfile,
    today: NaiveDate,
    dice: &mut RewardDice,
) -> Result<(UserProfile, CheckInOutcome), QqBotError> {
    ensure_eligible(profile, today)?;
    let reward = dice.roll_reward();
    check_in_with_reward(profile, today, reward)
}

/// 以指定奖励签到
pub fn check_in_with_reward(
    profile: &UserProfile,
    today: NaiveDate,
    reward: u64,
) -> Result<(UserProfile, CheckInOutcome), QqBotError> {
    ensure_eligible(profile, today)?;

    let mut updated = profile.clone();
    let mut level = profile.level.max(1);
    let mut experience = profile.experience.saturating_add(reward);
    let mut leveled_up = false;

    while level < FLAT_THRESHOLD_LEVEL && experience >= threshold_for(level) {
        experience -= threshold_for(level);
        level += 1;
        leveled_up = true;
    }

    // 之后阈值不变，一次算出剩余的升级数
    if level >= FLAT_THRESHOLD_LEVEL {
        let threshold = threshold_for(level);
        let extra = experience / threshold;
        if extra > 0 {
            experience %= threshold;
            level = level.saturating_add(u32::try_from(extra).unwrap_or(u32::MAX));
            leveled_up = true;
        }
    }

    updated.last_check_in = Some(today);
    updated.coins = updated.coins.saturating_add(reward);
    updated.experience = experience;
    updated.level = level;

    let outcome = CheckInOutcome {
        reward,
        level,
        experience,
        next_threshold: threshold_for(level),
        leveled_up,
        coins: updated.coins,
    };

    Ok((updated, outcome))
}
