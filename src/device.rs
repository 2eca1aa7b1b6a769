//! 3D input device and its sampling thread.
//!
//! A [`HapticDevice`] is polled on a dedicated thread at a fixed target rate.
//! Each pass reads position, rotation and the first user switch, commands
//! zero force, and overwrites a shared [`DeviceSample`] slot. The sampling
//! thread never sees cloth state; the window reads the newest snapshot once
//! per frame to draw the device cursor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glam::{Mat3, Vec3};

use crate::error::DeviceError;

/// A 3-DoF or 6-DoF input device with force output.
pub trait HapticDevice: Send {
    fn open(&mut self) -> Result<(), DeviceError>;
    fn calibrate(&mut self) -> Result<(), DeviceError>;
    fn close(&mut self);

    /// Tool position in world units.
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Mat3;
    /// State of user switch `index`. Devices without one report `false`.
    fn user_switch(&self, index: u32) -> bool;
    fn set_force_and_torque_and_gripper_force(&mut self, force: Vec3, torque: Vec3, gripper: f32);
}

/// Device with no hardware behind it: sits at a fixed pose and ignores
/// force commands.
#[derive(Debug, Clone)]
pub struct IdleDevice {
    position: Vec3,
    open: bool,
}

impl IdleDevice {
    pub fn new() -> Self {
        Self::at(Vec3::ZERO)
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Default for IdleDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HapticDevice for IdleDevice {
    fn open(&mut self) -> Result<(), DeviceError> {
        self.open = true;
        Ok(())
    }

    fn calibrate(&mut self) -> Result<(), DeviceError> {
        if !self.open {
            return Err(DeviceError::Calibrate("device is not open".into()));
        }
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Mat3 {
        Mat3::IDENTITY
    }

    fn user_switch(&self, _index: u32) -> bool {
        false
    }

    fn set_force_and_torque_and_gripper_force(&mut self, _force: Vec3, _torque: Vec3, _gripper: f32) {}
}

/// One pass of the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSample {
    pub position: Vec3,
    pub rotation: Mat3,
    pub button: bool,
    /// Measured loop rate at the time of sampling.
    pub rate_hz: f32,
}

/// Counts signals and reports them per second over one-second windows.
#[derive(Debug, Clone)]
pub struct FrequencyCounter {
    window_start: Instant,
    count: u64,
    frequency: f32,
}

impl FrequencyCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
            frequency: 0.0,
        }
    }

    pub fn signal(&mut self, n: u64) -> f32 {
        self.signal_at(n, Instant::now())
    }

    fn signal_at(&mut self, n: u64, now: Instant) -> f32 {
        self.count += n;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Self::WINDOW {
            self.frequency = self.count as f32 / elapsed.as_secs_f32();
            self.count = 0;
            self.window_start = now;
        }
        self.frequency
    }

    /// Rate over the last completed window.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Running sampling thread. Owns the device until shutdown.
pub struct DeviceLoop {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<Box<dyn HapticDevice>>>,
    latest: Arc<Mutex<Option<DeviceSample>>>,
}

impl DeviceLoop {
    /// Open and calibrate `device`, then start sampling it at `rate_hz`.
    pub fn start(mut device: Box<dyn HapticDevice>, rate_hz: f32) -> Result<Self, DeviceError> {
        if !(rate_hz.is_finite() && rate_hz > 0.0) {
            return Err(DeviceError::Spawn(format!("invalid sampling rate {rate_hz}")));
        }
        let period = Duration::try_from_secs_f32(1.0 / rate_hz)
            .map_err(|e| DeviceError::Spawn(format!("invalid sampling rate {rate_hz}: {e}")))?;
        device.open()?;
        if let Err(e) = device.calibrate() {
            device.close();
            return Err(e);
        }

        let running = Arc::new(AtomicBool::new(true));
        let latest = Arc::new(Mutex::new(None));

        let flag = Arc::clone(&running);
        let slot = Arc::clone(&latest);
        let handle = thread::Builder::new()
            .name("device-loop".into())
            .spawn(move || {
                let mut counter = FrequencyCounter::new();
                let mut next = Instant::now();
                while flag.load(Ordering::Acquire) {
                    let sample = DeviceSample {
                        position: device.position(),
                        rotation: device.rotation(),
                        button: device.user_switch(0),
                        rate_hz: counter.frequency(),
                    };
                    device.set_force_and_torque_and_gripper_force(Vec3::ZERO, Vec3::ZERO, 0.0);
                    counter.signal(1);

                    if let Ok(mut slot) = slot.lock() {
                        *slot = Some(sample);
                    }

                    next += period;
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    } else {
                        next = now;
                    }
                }
                device
            })
            .map_err(|e| DeviceError::Spawn(e.to_string()))?;

        log::info!("Device loop started at {} Hz", rate_hz);
        Ok(Self {
            running,
            handle: Some(handle),
            latest,
        })
    }

    /// Newest sample published by the thread, if any.
    pub fn latest(&self) -> Option<DeviceSample> {
        self.latest.lock().ok().and_then(|slot| *slot)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the thread, wait for it, then close the device. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.running.store(false, Ordering::Release);
        match handle.join() {
            Ok(mut device) => {
                device.close();
                log::info!("Device loop stopped");
            }
            Err(_) => log::error!("Device loop thread panicked"),
        }
    }
}

impl Drop for DeviceLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for DeviceLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLoop")
            .field("running", &self.is_running())
            .field("latest", &self.latest())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Records lifecycle calls so shutdown order can be checked.
    struct Recording {
        log: Arc<Mutex<Vec<&'static str>>>,
        fail_calibrate: bool,
    }

    impl HapticDevice for Recording {
        fn open(&mut self) -> Result<(), DeviceError> {
            self.log.lock().unwrap().push("open");
            Ok(())
        }
        fn calibrate(&mut self) -> Result<(), DeviceError> {
            self.log.lock().unwrap().push("calibrate");
            if self.fail_calibrate {
                Err(DeviceError::Calibrate("no home".into()))
            } else {
                Ok(())
            }
        }
        fn close(&mut self) {
            self.log.lock().unwrap().push("close");
        }
        fn position(&self) -> Vec3 {
            Vec3::new(0.1, 0.2, 0.3)
        }
        fn rotation(&self) -> Mat3 {
            Mat3::IDENTITY
        }
        fn user_switch(&self, _index: u32) -> bool {
            true
        }
        fn set_force_and_torque_and_gripper_force(&mut self, force: Vec3, torque: Vec3, gripper: f32) {
            assert_eq!(force, Vec3::ZERO);
            assert_eq!(torque, Vec3::ZERO);
            assert_eq!(gripper, 0.0);
        }
    }

    #[test]
    fn test_loop_samples_and_shuts_down_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let device = Recording {
            log: Arc::clone(&log),
            fail_calibrate: false,
        };
        let mut dl = DeviceLoop::start(Box::new(device), 2000.0).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        let sample = loop {
            if let Some(s) = dl.latest() {
                break s;
            }
            assert!(Instant::now() < deadline, "no sample received");
            thread::sleep(Duration::from_millis(1));
        };
        assert_eq!(sample.position, Vec3::new(0.1, 0.2, 0.3));
        assert!(sample.button);

        dl.shutdown();
        assert!(!dl.is_running());
        dl.shutdown();
        assert_eq!(*log.lock().unwrap(), vec!["open", "calibrate", "close"]);
    }

    #[test]
    fn test_calibrate_failure_closes_device() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let device = Recording {
            log: Arc::clone(&log),
            fail_calibrate: true,
        };
        let err = DeviceLoop::start(Box::new(device), 1000.0).unwrap_err();
        assert!(matches!(err, DeviceError::Calibrate(_)));
        assert_eq!(*log.lock().unwrap(), vec!["open", "calibrate", "close"]);
    }

    #[test]
    fn test_rejects_bad_rate() {
        assert!(DeviceLoop::start(Box::new(IdleDevice::new()), 0.0).is_err());
    }

    #[test]
    fn test_rejects_rate_too_small_for_a_period() {
        let err = DeviceLoop::start(Box::new(IdleDevice::new()), 1e-25).unwrap_err();
        assert!(matches!(err, DeviceError::Spawn(_)));
    }

    /// Reports how many times it has been read as the x coordinate.
    struct Counting {
        reads: Arc<AtomicUsize>,
    }

    impl HapticDevice for Counting {
        fn open(&mut self) -> Result<(), DeviceError> {
            Ok(())
        }
        fn calibrate(&mut self) -> Result<(), DeviceError> {
            Ok(())
        }
        fn close(&mut self) {}
        fn position(&self) -> Vec3 {
            let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            Vec3::new(n as f32, 0.0, 0.0)
        }
        fn rotation(&self) -> Mat3 {
            Mat3::IDENTITY
        }
        fn user_switch(&self, _index: u32) -> bool {
            false
        }
        fn set_force_and_torque_and_gripper_force(&mut self, _: Vec3, _: Vec3, _: f32) {}
    }

    #[test]
    fn test_unread_samples_keep_only_the_newest() {
        let reads = Arc::new(AtomicUsize::new(0));
        let device = Counting {
            reads: Arc::clone(&reads),
        };
        let mut dl = DeviceLoop::start(Box::new(device), 5000.0).unwrap();
        thread::sleep(Duration::from_millis(50));
        dl.shutdown();

        let total = reads.load(Ordering::SeqCst);
        assert!(total > 1);
        let sample = dl.latest().unwrap();
        assert_eq!(sample.position.x, total as f32);
    }

    #[test]
    fn test_idle_device_requires_open() {
        let mut dev = IdleDevice::new();
        assert!(dev.calibrate().is_err());
        dev.open().unwrap();
        assert!(dev.calibrate().is_ok());
        dev.close();
        assert!(!dev.is_open());
    }

    #[test]
    fn test_frequency_counter() {
        let t0 = Instant::now();
        let mut counter = FrequencyCounter::starting_at(t0);
        for i in 1..=999 {
            counter.signal_at(1, t0 + Duration::from_millis(i));
        }
        assert_eq!(counter.frequency(), 0.0);
        let f = counter.signal_at(1, t0 + Duration::from_secs(1));
        assert!((f - 1000.0).abs() < 1e-3);
    }
}
