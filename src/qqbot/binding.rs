use crate::qqbot::error::QqBotError;
use crate::qqbot::store::{Profiles, UserProfile};

/// QQ 号只能由数字组成
pub fn is_valid_account(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit())
}

/// 为 `user_id` 绑定 QQ 号
///
/// 成功时返回更新后的资料，由调用方写回 `users`。
pub fn bind(user_id: &str, users: &Profiles, candidate: &str) -> Result<UserProfile, QqBotError> {
    if !is_valid_account(candidate) {
        return Err(QqBotError::InvalidFormat);
    }

    let mut profile = users.get(user_id).cloned().unwrap_or_default();
    if let Some(existing) = &profile.external_account {
        return Err(QqBotError::AlreadyBound(existing.clone()));
    }

    let taken = users
        .iter()
        .filter(|(uid, _)| uid.as_str() != user_id)
        .any(|(_, info)| info.external_account.as_deref() == Some(candidate));
    if taken {
        return Err(QqBotError::DuplicateAccount);
    }

    profile.external_account = Some(candidate.to_string());
    Ok(profile)
}
