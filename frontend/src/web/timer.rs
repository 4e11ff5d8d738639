//! 定时器封装

use std::time::Duration;

use gloo_timers::future::TimeoutFuture;

/// 异步等待指定时长
pub async fn sleep(duration: Duration) {
    let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    TimeoutFuture::new(millis).await;
}
