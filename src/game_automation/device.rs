// Device capabilities consumed by the automation loop.
//
// The loop only needs a frame source and an input sink. `AdbBackend`
// provides both; tests plug in scripted fakes.
use super::error::AutomationResult;
use super::frame::Frame;
use super::types::PixelPoint;
use crate::adb::AdbBackend;

/// Snapshot the current screen as one complete frame.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    async fn capture(&mut self) -> AutomationResult<Frame>;
}

/// Deliver gestures to the device. No acknowledgement beyond `Ok`.
#[allow(async_fn_in_trait)]
pub trait InputSink {
    async fn drag(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        duration_ms: u32,
    ) -> AutomationResult<()>;

    async fn tap(&mut self, at: PixelPoint) -> AutomationResult<()>;
}

impl FrameSource for AdbBackend {
    async fn capture(&mut self) -> AutomationResult<Frame> {
        let capture = self.screen_capture().await?;
        log::debug!(
            "📸 Captured screenshot ({} bytes, {}ms)",
            capture.bytes.len(),
            capture.duration_ms
        );
        Ok(Frame::from_encoded(&capture.bytes)?)
    }
}

impl InputSink for AdbBackend {
    async fn drag(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        duration_ms: u32,
    ) -> AutomationResult<()> {
        self.swipe(from.x, from.y, to.x, to.y, Some(duration_ms))
            .await?;
        Ok(())
    }

    async fn tap(&mut self, at: PixelPoint) -> AutomationResult<()> {
        AdbBackend::tap(self, at.x, at.y).await?;
        Ok(())
    }
}
