use std::cell::{Ref, RefCell};
use std::convert::TryInto;
use std::rc::Rc;

use types::{ByteOrder, PhysAddr};

/// Flat guest-physical RAM.
///
/// The machine, the loader and every CPU share the same backing store;
/// cloning hands out another reference to the same bytes. Word accessors
/// honor the guest byte order so encoded blobs come out exactly as the
/// guest will fetch them.
#[derive(Clone)]
pub struct GuestMemory {
    mem: Rc<RefCell<Vec<u8>>>,
    order: ByteOrder,
}

impl GuestMemory {
    pub fn new(size: usize, order: ByteOrder) -> Self {
        Self {
            mem: Rc::new(RefCell::new(vec![0u8; size])),
            order,
        }
    }

    pub fn size(&self) -> usize {
        self.mem.borrow().len()
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Store a word in guest byte order. Out-of-range addresses are a
    /// board-configuration bug, not a runtime condition.
    pub fn store_u32(&self, addr: PhysAddr, val: u32) {
        let addr = addr.as_usize();
        let mut mem = self.mem.borrow_mut();
        if addr + 4 > mem.len() {
            panic!("store u32 out of bounds: addr = 0x{:08x}", addr);
        }
        mem[addr..addr + 4].copy_from_slice(&self.order.encode_u32(val));
    }

    pub fn load_u32(&self, addr: PhysAddr) -> u32 {
        let addr = addr.as_usize();
        let mem = self.mem.borrow();
        if addr + 4 > mem.len() {
            panic!("load u32 out of bounds: addr = 0x{:08x}", addr);
        }
        self.order
            .decode_u32(mem[addr..addr + 4].try_into().unwrap())
    }

    pub fn store_u8(&self, addr: PhysAddr, val: u8) {
        let addr = addr.as_usize();
        let mut mem = self.mem.borrow_mut();
        if addr >= mem.len() {
            panic!("store u8 out of bounds: addr = 0x{:08x}", addr);
        }
        mem[addr] = val;
    }

    pub fn load_u8(&self, addr: PhysAddr) -> u8 {
        self.mem.borrow()[addr.as_usize()]
    }

    pub fn write_bytes(&self, addr: PhysAddr, bytes: &[u8]) {
        let addr = addr.as_usize();
        let mut mem = self.mem.borrow_mut();
        if addr + bytes.len() > mem.len() {
            panic!(
                "write of {} bytes out of bounds: addr = 0x{:08x}",
                bytes.len(),
                addr
            );
        }
        mem[addr..addr + bytes.len()].copy_from_slice(bytes);
    }

    pub fn bytes(&self) -> Ref<Vec<u8>> {
        self.mem.borrow()
    }

    pub fn mem_slice(&self, start: usize, end: usize) -> Option<Ref<[u8]>> {
        let mem = self.mem.borrow();
        if end > mem.len() || start > end {
            return None;
        }
        Some(Ref::map(mem, move |v| &v[start..end]))
    }
}
