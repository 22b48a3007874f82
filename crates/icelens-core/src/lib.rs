//! Core components for hypervisor-based guest introspection.
//!
//! This crate contains the backend-agnostic pieces of the stack: typed
//! guest addresses, the [`Driver`] and [`Architecture`] seams, the cached
//! physical/virtual memory accessor [`Core`], and the [`OsModule`] trait
//! with its attach/dispatch [`Session`].

mod arch;
mod core;
mod driver;
mod error;
pub mod os;
mod reader;
mod session;
mod symbols;

#[cfg(test)]
pub(crate) mod testing;

use std::{cell::RefCell, num::NonZeroUsize};

use lru::LruCache;
use zerocopy::{FromBytes, IntoBytes};

pub use self::{
    arch::{Architecture, Registers},
    core::{AccessContext, AddressSpace, Gfn, Pa, Span, TranslationMechanism, Va},
    driver::Driver,
    error::{Error, PageFault, PageFaults},
    os::OsModule,
    reader::Reader,
    session::Session,
    symbols::SymbolStore,
};

/// The number of guest pages kept in the page-content cache.
const PAGE_CACHE_SIZE: usize = 4096;

/// The number of virtual-to-physical translations kept in the cache.
const V2P_CACHE_SIZE: usize = 8192;

/// The memory accessor over a hypervisor driver.
///
/// `Core` layers address translation, page-crossing reads and two small LRU
/// caches over the raw page interface of a [`Driver`]. All reads and writes
/// take an [`AccessContext`], so physical and virtual accesses share one
/// code path.
///
/// Caches hold state of a paused guest; callers that resume the guest must
/// [`flush_caches`] before trusting further reads.
///
/// [`flush_caches`]: Self::flush_caches
pub struct Core<D>
where
    D: Driver,
{
    driver: D,
    page_cache: RefCell<LruCache<Gfn, Vec<u8>>>,
    v2p_cache: RefCell<LruCache<(Va, Pa), Pa>>,
}

impl<D> Core<D>
where
    D: Driver,
{
    /// Creates a new core over the given driver.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            page_cache: RefCell::new(LruCache::new(
                NonZeroUsize::new(PAGE_CACHE_SIZE).unwrap(),
            )),
            v2p_cache: RefCell::new(LruCache::new(
                NonZeroUsize::new(V2P_CACHE_SIZE).unwrap(),
            )),
        }
    }

    /// Returns the underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Returns the register file of the virtual CPU.
    pub fn registers(
        &self,
    ) -> Result<<D::Architecture as Architecture>::Registers, Error> {
        self.driver.registers()
    }

    /// Replaces the register file of the virtual CPU.
    pub fn set_registers(
        &self,
        registers: &<D::Architecture as Architecture>::Registers,
    ) -> Result<(), Error> {
        self.driver.set_registers(registers)
    }

    /// Drops all cached pages and translations.
    pub fn flush_caches(&self) {
        self.page_cache.borrow_mut().clear();
        self.v2p_cache.borrow_mut().clear();
    }

    /// Translates a guest virtual address to a physical address.
    pub fn translate(&self, va: Va, root: Pa) -> Result<Pa, Error> {
        let page = Va(va.0 & !D::Architecture::PAGE_MASK);

        if let Some(&pa) = self.v2p_cache.borrow_mut().get(&(page, root)) {
            return Ok(pa + D::Architecture::va_offset(va));
        }

        let pa = D::Architecture::translate_address(self, va, root)?;

        self.v2p_cache
            .borrow_mut()
            .put((page, root), Pa(pa.0 & !D::Architecture::PAGE_MASK));

        Ok(pa)
    }

    /// Resolves an access context to a physical address.
    pub fn resolve(&self, ctx: AccessContext) -> Result<Pa, Error> {
        match ctx.mechanism {
            TranslationMechanism::Direct => Ok(Pa(ctx.address)),
            TranslationMechanism::Paging { root } => self.translate(Va(ctx.address), root),
        }
    }

    /// Reads memory into the provided buffer.
    ///
    /// The read may cross page boundaries; it either fills the whole buffer
    /// or fails without partial results.
    pub fn read(&self, ctx: impl Into<AccessContext>, buffer: &mut [u8]) -> Result<(), Error> {
        let ctx = ctx.into();
        let mut position = 0;

        while position < buffer.len() {
            let pa = self.resolve(ctx + position as u64)?;
            let offset = D::Architecture::pa_offset(pa) as usize;
            let length = usize::min(
                buffer.len() - position,
                D::Architecture::PAGE_SIZE as usize - offset,
            );

            self.read_frame(D::Architecture::gfn_from_pa(pa), |page| {
                buffer[position..position + length].copy_from_slice(&page[offset..offset + length]);
            })?;

            position += length;
        }

        Ok(())
    }

    /// Reads a `u8` from the guest.
    pub fn read_u8(&self, ctx: impl Into<AccessContext>) -> Result<u8, Error> {
        let mut buffer = [0u8; 1];
        self.read(ctx, &mut buffer)?;
        Ok(buffer[0])
    }

    /// Reads a `u16` from the guest.
    pub fn read_u16(&self, ctx: impl Into<AccessContext>) -> Result<u16, Error> {
        let mut buffer = [0u8; 2];
        self.read(ctx, &mut buffer)?;
        Ok(u16::from_le_bytes(buffer))
    }

    /// Reads a `u32` from the guest.
    pub fn read_u32(&self, ctx: impl Into<AccessContext>) -> Result<u32, Error> {
        let mut buffer = [0u8; 4];
        self.read(ctx, &mut buffer)?;
        Ok(u32::from_le_bytes(buffer))
    }

    /// Reads a `u64` from the guest.
    pub fn read_u64(&self, ctx: impl Into<AccessContext>) -> Result<u64, Error> {
        let mut buffer = [0u8; 8];
        self.read(ctx, &mut buffer)?;
        Ok(u64::from_le_bytes(buffer))
    }

    /// Reads a zero-extended little-endian unsigned integer of the given
    /// byte width (1, 2, 4 or 8).
    pub fn read_uint(&self, ctx: impl Into<AccessContext>, width: usize) -> Result<u64, Error> {
        match width {
            1 => Ok(u64::from(self.read_u8(ctx)?)),
            2 => Ok(u64::from(self.read_u16(ctx)?)),
            4 => Ok(u64::from(self.read_u32(ctx)?)),
            8 => self.read_u64(ctx),
            _ => Err(Error::InvalidAddressWidth),
        }
    }

    /// Reads a plain-data structure from the guest.
    pub fn read_struct<T>(&self, ctx: impl Into<AccessContext>) -> Result<T, Error>
    where
        T: FromBytes + IntoBytes,
    {
        let mut value = T::new_zeroed();
        self.read(ctx, value.as_mut_bytes())?;
        Ok(value)
    }

    /// Writes memory from the provided buffer.
    ///
    /// The write may cross page boundaries. Written frames are evicted from
    /// the page cache.
    pub fn write(&self, ctx: impl Into<AccessContext>, data: &[u8]) -> Result<(), Error> {
        let ctx = ctx.into();
        let mut position = 0;

        while position < data.len() {
            let pa = self.resolve(ctx + position as u64)?;
            let gfn = D::Architecture::gfn_from_pa(pa);
            let offset = D::Architecture::pa_offset(pa);
            let length = usize::min(
                data.len() - position,
                (D::Architecture::PAGE_SIZE - offset) as usize,
            );

            self.driver
                .write_page(gfn, offset, &data[position..position + length])?;
            self.page_cache.borrow_mut().pop(&gfn);

            position += length;
        }

        Ok(())
    }

    /// Writes a `u64` into the guest.
    pub fn write_u64(&self, ctx: impl Into<AccessContext>, value: u64) -> Result<(), Error> {
        self.write(ctx, &value.to_le_bytes())
    }

    fn read_frame(&self, gfn: Gfn, f: impl FnOnce(&[u8])) -> Result<(), Error> {
        let mut cache = self.page_cache.borrow_mut();

        if let Some(page) = cache.get(&gfn) {
            f(page);
            return Ok(());
        }

        let page = self.driver.read_page(gfn)?;
        f(&page);
        cache.put(gfn, page);

        Ok(())
    }
}
