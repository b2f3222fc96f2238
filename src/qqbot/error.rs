use thiserror::Error;

/// 指令处理错误
///
/// `Display` 即回复给用户的文本。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QqBotError {
    #[error("请先绑定QQ号，格式：/绑定 你的QQ号")]
    NotBound,
    #[error("你今天已经签过到了，明天再来吧！")]
    AlreadyCheckedIn,
    #[error("你已绑定过QQ号：{0}，如需更换请联系管理员")]
    AlreadyBound(String),
    #[error("该QQ号已被绑定，不能重复绑定")]
    DuplicateAccount,
    #[error("请输入正确的QQ号，例如：绑定 123456789")]
    InvalidFormat,
    #[error("用户数据读写失败: {0}")]
    PersistenceFailed(String),
}
