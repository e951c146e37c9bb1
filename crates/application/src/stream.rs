//! 会话循环共用的小工具：带取消的等待与出站发送

use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ApplicationError;

/// 在会话生命周期内等待一个阻塞点
///
/// 生命周期先于 `fut` 结束时返回 [`ApplicationError::Cancelled`]，取消信号不会被吞掉。
pub async fn guarded<F, T>(lifetime: &CancellationToken, fut: F) -> Result<T, ApplicationError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = lifetime.cancelled() => Err(ApplicationError::Cancelled),
        value = fut => Ok(value),
    }
}

/// 向出站通道写一帧；对端已关闭视为传输错误
pub async fn emit<T>(
    outbound: &mpsc::Sender<T>,
    frame: T,
    lifetime: &CancellationToken,
) -> Result<(), ApplicationError> {
    guarded(lifetime, outbound.send(frame))
        .await?
        .map_err(|_| ApplicationError::transport("outbound stream closed"))
}
