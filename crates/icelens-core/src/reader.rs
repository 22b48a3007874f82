use crate::{AccessContext, AddressSpace, Architecture, Core, Driver, Error, Va};

/// A virtual-memory reader bound to one address space.
///
/// The reader picks the page-table root per access: kernel-half addresses
/// translate through the kernel root, user-half addresses through the user
/// root. It carries no other state and is cheap to construct per process.
pub struct Reader<'a, D>
where
    D: Driver,
{
    core: &'a Core<D>,
    space: AddressSpace,
}

impl<'a, D> Reader<'a, D>
where
    D: Driver,
{
    /// Creates a reader over the given address space.
    pub fn new(core: &'a Core<D>, space: AddressSpace) -> Self {
        Self { core, space }
    }

    /// Returns the address space the reader is bound to.
    pub fn space(&self) -> AddressSpace {
        self.space
    }

    /// Rebinds the reader to a different address space.
    pub fn set_space(&mut self, space: AddressSpace) {
        self.space = space;
    }

    /// Builds the access context for a virtual address, selecting the root
    /// by address half.
    pub fn ctx(&self, va: Va) -> AccessContext {
        let root = if D::Architecture::va_is_kernel(va) {
            self.space.kernel_root
        } else {
            self.space.user_root
        };

        AccessContext::paging(va, root)
    }

    /// Reads memory at a virtual address into the provided buffer.
    pub fn read(&self, va: Va, buffer: &mut [u8]) -> Result<(), Error> {
        self.core.read(self.ctx(va), buffer)
    }

    /// Reads a `u8` at a virtual address.
    pub fn read_u8(&self, va: Va) -> Result<u8, Error> {
        self.core.read_u8(self.ctx(va))
    }

    /// Reads a `u16` at a virtual address.
    pub fn read_u16(&self, va: Va) -> Result<u16, Error> {
        self.core.read_u16(self.ctx(va))
    }

    /// Reads a `u32` at a virtual address.
    pub fn read_u32(&self, va: Va) -> Result<u32, Error> {
        self.core.read_u32(self.ctx(va))
    }

    /// Reads a `u64` at a virtual address.
    pub fn read_u64(&self, va: Va) -> Result<u64, Error> {
        self.core.read_u64(self.ctx(va))
    }

    /// Reads a pointer-sized value at a virtual address.
    pub fn read_ptr(&self, va: Va) -> Result<Va, Error> {
        Ok(Va(self.read_u64(va)?))
    }

    /// Writes memory at a virtual address from the provided buffer.
    pub fn write(&self, va: Va, data: &[u8]) -> Result<(), Error> {
        self.core.write(self.ctx(va), data)
    }

    /// Writes a `u64` at a virtual address.
    pub fn write_u64(&self, va: Va, value: u64) -> Result<(), Error> {
        self.core.write_u64(self.ctx(va), value)
    }
}
