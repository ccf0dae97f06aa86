#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use spool_config::{
    DeviceMode, JobCommand, JobInfo, PrinterAccess, RawHandle, SpoolApi, SpoolError, SpoolResult,
};

/// Recording spooler double.
///
/// Single-threaded by construction; state lives in cells so the
/// `&self`-based [`SpoolApi`] methods can record traffic.
pub struct MockSpool {
    pub default_name: RefCell<String>,
    pub driver_devmode: RefCell<Vec<u8>>,
    pub info_devmode: RefCell<Option<Vec<u8>>>,
    pub driver_len_override: Cell<Option<i32>>,

    pub deny_open: Cell<bool>,
    pub missing_printer: Cell<bool>,
    pub fail_merge: Cell<bool>,
    pub fail_commit: Cell<bool>,

    pub opens: Cell<usize>,
    pub closes: Cell<usize>,
    pub opened_names: RefCell<Vec<String>>,
    pub opened_access: RefCell<Vec<PrinterAccess>>,
    pub events: RefCell<Vec<&'static str>>,
    pub committed: RefCell<Option<Vec<u8>>>,
    pub broadcasts: Cell<usize>,

    pub port: RefCell<Option<String>>,
    pub paper_name_list: RefCell<Vec<String>>,
    pub paper_kind_list: RefCell<Vec<u16>>,

    pub queue: RefCell<Vec<JobInfo>>,
    pub commands: RefCell<Vec<(u32, JobCommand)>>,

    next_handle: Cell<isize>,
}

impl MockSpool {
    /// A mock whose driver and info record both carry a blank device mode
    /// for `printer`, which is also the default printer.
    pub fn new(printer: &str) -> Self {
        let devmode = DeviceMode::blank(printer).into_bytes();
        Self {
            default_name: RefCell::new(printer.to_string()),
            driver_devmode: RefCell::new(devmode.clone()),
            info_devmode: RefCell::new(Some(devmode)),
            driver_len_override: Cell::new(None),
            deny_open: Cell::new(false),
            missing_printer: Cell::new(false),
            fail_merge: Cell::new(false),
            fail_commit: Cell::new(false),
            opens: Cell::new(0),
            closes: Cell::new(0),
            opened_names: RefCell::new(Vec::new()),
            opened_access: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
            committed: RefCell::new(None),
            broadcasts: Cell::new(0),
            port: RefCell::new(Some("USB001".to_string())),
            paper_name_list: RefCell::new(Vec::new()),
            paper_kind_list: RefCell::new(Vec::new()),
            queue: RefCell::new(Vec::new()),
            commands: RefCell::new(Vec::new()),
            next_handle: Cell::new(1),
        }
    }

    /// Replace the device mode both query paths hand out
    pub fn seed_devmode(&self, dm: &DeviceMode) {
        *self.driver_devmode.borrow_mut() = dm.as_bytes().to_vec();
        *self.info_devmode.borrow_mut() = Some(dm.as_bytes().to_vec());
    }

    pub fn event_log(&self) -> Vec<&'static str> {
        self.events.borrow().clone()
    }

    fn record(&self, event: &'static str) {
        self.events.borrow_mut().push(event);
    }
}

impl SpoolApi for MockSpool {
    fn default_printer(&self) -> SpoolResult<String> {
        Ok(self.default_name.borrow().clone())
    }

    fn open(&self, name: &str, access: PrinterAccess) -> SpoolResult<RawHandle> {
        self.opens.set(self.opens.get() + 1);
        self.opened_names.borrow_mut().push(name.to_string());
        self.opened_access.borrow_mut().push(access);

        if self.missing_printer.get() {
            return Err(SpoolError::NotFound {
                name: name.to_string(),
                code: 1801,
            });
        }
        if self.deny_open.get() {
            return Err(SpoolError::AccessDenied {
                name: name.to_string(),
                code: 5,
            });
        }

        self.record("open");
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        Ok(RawHandle(handle))
    }

    fn close(&self, handle: RawHandle) {
        if handle.is_null() {
            return;
        }
        self.closes.set(self.closes.get() + 1);
        self.record("close");
    }

    fn info_device_mode(&self, _handle: RawHandle) -> SpoolResult<Option<Vec<u8>>> {
        self.record("info");
        Ok(self.info_devmode.borrow().clone())
    }

    fn driver_device_mode_len(&self, _handle: RawHandle, _device: &str) -> SpoolResult<i32> {
        self.record("probe");
        Ok(self
            .driver_len_override
            .get()
            .unwrap_or(self.driver_devmode.borrow().len() as i32))
    }

    fn read_driver_device_mode(
        &self,
        _handle: RawHandle,
        _device: &str,
        buf: &mut [u8],
    ) -> SpoolResult<()> {
        self.record("fetch");
        let data = self.driver_devmode.borrow();
        assert!(buf.len() >= data.len(), "fetch buffer smaller than probe");
        buf[..data.len()].copy_from_slice(&data);
        Ok(())
    }

    fn merge_device_mode(
        &self,
        _handle: RawHandle,
        _device: &str,
        _buf: &mut [u8],
    ) -> SpoolResult<()> {
        self.record("merge");
        if self.fail_merge.get() {
            return Err(SpoolError::DriverRejected { code: 13 });
        }
        Ok(())
    }

    fn commit_device_mode(&self, _handle: RawHandle, device_mode: &[u8]) -> SpoolResult<()> {
        self.record("commit");
        if self.fail_commit.get() {
            return Err(SpoolError::CommitFailed { code: 5 });
        }
        *self.committed.borrow_mut() = Some(device_mode.to_vec());
        Ok(())
    }

    fn broadcast_change(&self, _device: &str) {
        self.record("broadcast");
        self.broadcasts.set(self.broadcasts.get() + 1);
    }

    fn printers(&self) -> SpoolResult<Vec<String>> {
        Ok(vec![self.default_name.borrow().clone()])
    }

    fn printer_port(&self, _name: &str) -> SpoolResult<Option<String>> {
        Ok(self.port.borrow().clone())
    }

    fn paper_names(&self, _device: &str, _port: &str) -> SpoolResult<Vec<String>> {
        Ok(self.paper_name_list.borrow().clone())
    }

    fn paper_kinds(&self, _device: &str, _port: &str) -> SpoolResult<Vec<u16>> {
        Ok(self.paper_kind_list.borrow().clone())
    }

    fn jobs(&self, _handle: RawHandle) -> SpoolResult<Vec<JobInfo>> {
        Ok(self.queue.borrow().clone())
    }

    fn set_job(&self, _handle: RawHandle, job_id: u32, command: JobCommand) -> SpoolResult<()> {
        self.commands.borrow_mut().push((job_id, command));
        Ok(())
    }
}
