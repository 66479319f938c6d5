//! SSD1680 e-paper controller
//!
//! Drives the 2.13" and 1.54" monochrome panels over a 4-wire SPI bus
//! (CS and D/C as plain GPIOs). Frames arrive in logical coordinates and
//! are rotated into controller RAM order one row at a time, so no second
//! full-size buffer is needed.
//!
//! Two entry points share the command set: the blocking [`EpdPanel`]
//! implementation used at boot and shutdown, and `*_async` methods used by
//! the background refresh task so the busy wait yields to the executor.

use embassy_time::{with_timeout, Duration};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use embedded_hal_async::digital::Wait;
use embedded_hal_async::spi::SpiBus as AsyncSpiBus;
use vigil_display::{DisplayError, EpdPanel, PanelModel, RefreshKind, Rotation};

// SSD1680 commands
const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
const DEEP_SLEEP: u8 = 0x10;
const DATA_ENTRY_MODE: u8 = 0x11;
const SW_RESET: u8 = 0x12;
const TEMP_SENSOR_CONTROL: u8 = 0x18;
const MASTER_ACTIVATION: u8 = 0x20;
const DISPLAY_UPDATE_CONTROL_1: u8 = 0x21;
const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
const WRITE_RAM_BW: u8 = 0x24;
const WRITE_RAM_PREVIOUS: u8 = 0x26;
const BORDER_WAVEFORM: u8 = 0x3C;
const SET_RAM_X_RANGE: u8 = 0x44;
const SET_RAM_Y_RANGE: u8 = 0x45;
const SET_RAM_X_COUNTER: u8 = 0x4E;
const SET_RAM_Y_COUNTER: u8 = 0x4F;

/// Update sequence: full waveform with clock and analog on/off
const SEQUENCE_FULL: u8 = 0xF7;
/// Update sequence: partial (differential) waveform
const SEQUENCE_FAST: u8 = 0xFF;

/// Longest the controller may report busy (a full refresh is ~2 s)
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Widest supported panel row in bytes
const MAX_ROW_BYTES: usize = 25;

/// Fill one controller RAM row from a logical frame
///
/// Logical pixels are 1 = ink; controller RAM is 1 = white.
pub fn native_row(
    frame: &[u8],
    width: u16,
    height: u16,
    rotation: Rotation,
    native: (u16, u16),
    ny: u16,
    out: &mut [u8],
) {
    let (nw, nh) = native;
    let stride = (width as usize).div_ceil(8);
    for (bx, byte) in out.iter_mut().enumerate() {
        let mut value = 0xFF;
        for bit in 0..8u16 {
            let nx = bx as u16 * 8 + bit;
            if nx >= nw {
                break;
            }
            let (lx, ly) = match rotation {
                Rotation::Deg0 => (nx, ny),
                Rotation::Deg90 => (ny, nw - 1 - nx),
                Rotation::Deg180 => (nw - 1 - nx, nh - 1 - ny),
                Rotation::Deg270 => (nh - 1 - ny, nx),
            };
            if lx >= width || ly >= height {
                continue;
            }
            let idx = ly as usize * stride + lx as usize / 8;
            let ink = frame.get(idx).is_some_and(|b| b & (0x80 >> (lx % 8)) != 0);
            if ink {
                value &= !(0x80 >> bit);
            }
        }
        *byte = value;
    }
}

/// SSD1680 on SPI with GPIO control lines
pub struct Ssd1680<SPI, CS, DC, RST, BUSY, D> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: D,
    model: PanelModel,
    rotation: Rotation,
}

impl<SPI, CS, DC, RST, BUSY, D> Ssd1680<SPI, CS, DC, RST, BUSY, D> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spi: SPI,
        cs: CS,
        dc: DC,
        rst: RST,
        busy: BUSY,
        delay: D,
        model: PanelModel,
        rotation: Rotation,
    ) -> Self {
        Self {
            spi,
            cs,
            dc,
            rst,
            busy,
            delay,
            model,
            rotation,
        }
    }

    pub fn model(&self) -> PanelModel {
        self.model
    }

    fn row_bytes(&self) -> usize {
        let (nw, _) = self.model.native_size();
        (nw as usize).div_ceil(8).min(MAX_ROW_BYTES)
    }

    /// Controller configuration after reset, as (command, data) pairs
    fn init_sequence(&self) -> [(u8, heapless::Vec<u8, 4>); 7] {
        let (_, nh) = self.model.native_size();
        let last_row = nh.saturating_sub(1);
        let [lo, hi] = last_row.to_le_bytes();
        let last_col = (self.row_bytes() as u8).saturating_sub(1);
        let v = |data: &[u8]| heapless::Vec::from_slice(data).unwrap_or_default();
        [
            (DRIVER_OUTPUT_CONTROL, v(&[lo, hi, 0x00])),
            // X increment, Y increment
            (DATA_ENTRY_MODE, v(&[0x03])),
            (SET_RAM_X_RANGE, v(&[0x00, last_col])),
            (SET_RAM_Y_RANGE, v(&[0x00, 0x00, lo, hi])),
            (BORDER_WAVEFORM, v(&[0x05])),
            (DISPLAY_UPDATE_CONTROL_1, v(&[0x00, 0x80])),
            // Internal temperature sensor
            (TEMP_SENSOR_CONTROL, v(&[0x80])),
        ]
    }
}

impl<SPI, CS, DC, RST, BUSY, D> Ssd1680<SPI, CS, DC, RST, BUSY, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    fn command(&mut self, cmd: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        self.dc.set_low().map_err(|_| DisplayError::Communication)?;
        self.spi.write(&[cmd]).map_err(|_| DisplayError::Communication)?;
        self.dc.set_high().map_err(|_| DisplayError::Communication)?;
        if !data.is_empty() {
            self.spi.write(data).map_err(|_| DisplayError::Communication)?;
        }
        self.spi.flush().map_err(|_| DisplayError::Communication)?;
        self.cs.set_high().map_err(|_| DisplayError::Communication)
    }

    fn wait_idle(&mut self) -> Result<(), DisplayError> {
        for _ in 0..BUSY_TIMEOUT_MS {
            if !self.busy.is_high().map_err(|_| DisplayError::Communication)? {
                return Ok(());
            }
            self.delay.delay_ms(1);
        }
        Err(DisplayError::Timeout)
    }

    fn write_ram(
        &mut self,
        cmd: u8,
        frame: &[u8],
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError> {
        let native = self.model.native_size();
        let row_bytes = self.row_bytes();
        let mut row = [0u8; MAX_ROW_BYTES];

        self.command(SET_RAM_X_COUNTER, &[0x00])?;
        self.command(SET_RAM_Y_COUNTER, &[0x00, 0x00])?;
        self.command(cmd, &[])?;
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        for ny in 0..native.1 {
            native_row(frame, width, height, self.rotation, native, ny, &mut row[..row_bytes]);
            self.spi
                .write(&row[..row_bytes])
                .map_err(|_| DisplayError::Communication)?;
        }
        self.spi.flush().map_err(|_| DisplayError::Communication)?;
        self.cs.set_high().map_err(|_| DisplayError::Communication)
    }
}

impl<SPI, CS, DC, RST, BUSY, D> EpdPanel for Ssd1680<SPI, CS, DC, RST, BUSY, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    fn init(&mut self) -> Result<(), DisplayError> {
        if self.model.native_size() == (0, 0) {
            return Err(DisplayError::NotInitialized);
        }
        self.rst.set_low().map_err(|_| DisplayError::Communication)?;
        self.delay.delay_ms(10);
        self.rst.set_high().map_err(|_| DisplayError::Communication)?;
        self.delay.delay_ms(10);
        self.wait_idle()?;

        self.command(SW_RESET, &[])?;
        self.wait_idle()?;
        for (cmd, data) in self.init_sequence() {
            self.command(cmd, &data)?;
        }
        self.wait_idle()
    }

    fn transfer(
        &mut self,
        frame: &[u8],
        width: u16,
        height: u16,
        kind: RefreshKind,
    ) -> Result<(), DisplayError> {
        self.write_ram(WRITE_RAM_BW, frame, width, height)?;
        let sequence = match kind {
            RefreshKind::Full => SEQUENCE_FULL,
            RefreshKind::Fast => SEQUENCE_FAST,
        };
        self.command(DISPLAY_UPDATE_CONTROL_2, &[sequence])?;
        self.command(MASTER_ACTIVATION, &[])?;
        self.wait_idle()?;
        // Differential updates compare against this copy
        self.write_ram(WRITE_RAM_PREVIOUS, frame, width, height)
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        self.command(DEEP_SLEEP, &[0x01])
    }
}

impl<SPI, CS, DC, RST, BUSY, D> Ssd1680<SPI, CS, DC, RST, BUSY, D>
where
    SPI: AsyncSpiBus,
    CS: OutputPin,
    DC: OutputPin,
    BUSY: Wait,
{
    async fn command_async(&mut self, cmd: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        self.dc.set_low().map_err(|_| DisplayError::Communication)?;
        self.spi
            .write(&[cmd])
            .await
            .map_err(|_| DisplayError::Communication)?;
        self.dc.set_high().map_err(|_| DisplayError::Communication)?;
        if !data.is_empty() {
            self.spi
                .write(data)
                .await
                .map_err(|_| DisplayError::Communication)?;
        }
        self.spi
            .flush()
            .await
            .map_err(|_| DisplayError::Communication)?;
        self.cs.set_high().map_err(|_| DisplayError::Communication)
    }

    async fn wait_idle_async(&mut self) -> Result<(), DisplayError> {
        let timeout = Duration::from_millis(BUSY_TIMEOUT_MS as u64);
        match with_timeout(timeout, self.busy.wait_for_low()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(DisplayError::Communication),
            Err(_) => Err(DisplayError::Timeout),
        }
    }

    async fn write_ram_async(
        &mut self,
        cmd: u8,
        frame: &[u8],
        width: u16,
        height: u16,
    ) -> Result<(), DisplayError> {
        let native = self.model.native_size();
        let row_bytes = self.row_bytes();
        let mut row = [0u8; MAX_ROW_BYTES];

        self.command_async(SET_RAM_X_COUNTER, &[0x00]).await?;
        self.command_async(SET_RAM_Y_COUNTER, &[0x00, 0x00]).await?;
        self.command_async(cmd, &[]).await?;
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        for ny in 0..native.1 {
            native_row(frame, width, height, self.rotation, native, ny, &mut row[..row_bytes]);
            self.spi
                .write(&row[..row_bytes])
                .await
                .map_err(|_| DisplayError::Communication)?;
        }
        self.spi
            .flush()
            .await
            .map_err(|_| DisplayError::Communication)?;
        self.cs.set_high().map_err(|_| DisplayError::Communication)
    }

    /// Transfer a frame and wait for the refresh without blocking the executor
    pub async fn transfer_async(
        &mut self,
        frame: &[u8],
        width: u16,
        height: u16,
        kind: RefreshKind,
    ) -> Result<(), DisplayError> {
        self.write_ram_async(WRITE_RAM_BW, frame, width, height)
            .await?;
        let sequence = match kind {
            RefreshKind::Full => SEQUENCE_FULL,
            RefreshKind::Fast => SEQUENCE_FAST,
        };
        self.command_async(DISPLAY_UPDATE_CONTROL_2, &[sequence])
            .await?;
        self.command_async(MASTER_ACTIVATION, &[]).await?;
        self.wait_idle_async().await?;
        self.write_ram_async(WRITE_RAM_PREVIOUS, frame, width, height)
            .await
    }

    /// Put the controller to sleep from async context
    pub async fn sleep_async(&mut self) -> Result<(), DisplayError> {
        self.command_async(DEEP_SLEEP, &[0x01]).await
    }
}
