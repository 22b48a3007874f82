use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// A page table entry of the 4-level AMD64 paging hierarchy.
///
/// The same layout is used at every level; the PS bit is only meaningful
/// at the PDPT and PD levels.
#[repr(transparent)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct PageTableEntry(pub u64);

impl PageTableEntry {
    /// Checks the present bit.
    pub fn present(self) -> bool {
        self.0 & 1 != 0
    }

    /// Checks the page-size (PS) bit, i.e. whether the entry maps a large
    /// page instead of pointing at the next table.
    pub fn large(self) -> bool {
        self.0 & (1 << 7) != 0
    }

    /// Returns the page frame number (bits 12..52).
    pub fn pfn(self) -> u64 {
        (self.0 >> 12) & 0xf_ffff_ffff
    }
}

/// One level of the paging hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageTableLevel {
    /// Page map level 4 (bits 39..48 of the virtual address).
    Pml4,

    /// Page directory pointer table (bits 30..39); may map a 1 GiB page.
    Pdpt,

    /// Page directory (bits 21..30); may map a 2 MiB page.
    Pd,

    /// Page table (bits 12..21).
    Pt,
}

impl PageTableLevel {
    /// The levels in walk order.
    pub const WALK: [Self; 4] = [Self::Pml4, Self::Pdpt, Self::Pd, Self::Pt];

    /// Returns the virtual-address bit position this level indexes at.
    pub fn shift(self) -> u64 {
        match self {
            Self::Pml4 => 39,
            Self::Pdpt => 30,
            Self::Pd => 21,
            Self::Pt => 12,
        }
    }

    /// Returns the table index for a virtual address at this level.
    pub fn index(self, va: u64) -> u64 {
        (va >> self.shift()) & 0x1ff
    }

    /// Returns the byte mask covered by a page mapped at this level.
    pub fn page_mask(self) -> u64 {
        (1 << self.shift()) - 1
    }

    /// Checks whether this level can terminate the walk with a large page.
    pub fn supports_large_pages(self) -> bool {
        matches!(self, Self::Pdpt | Self::Pd)
    }
}
