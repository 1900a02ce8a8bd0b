use crate::monitor::{KernelLayout, Session};
use std::fmt::Write;

pub struct Handler {
    layout: KernelLayout,
}

impl Handler {
    pub fn new(session: &Session<'_>) -> Self {
        Self {
            layout: session.layout(),
        }
    }

    pub fn handle(&self) -> String {
        let l = &self.layout;
        let phys = |addr: u32| addr.wrapping_sub(l.kernbase);

        let mut out = String::new();
        _ = writeln!(out, "Special kernel symbols:");
        _ = writeln!(out, "  start                   {:08x} (phys)", l.start);
        _ = writeln!(
            out,
            "  entry  {:08x} (virt)  {:08x} (phys)",
            l.entry,
            phys(l.entry)
        );
        _ = writeln!(
            out,
            "  etext  {:08x} (virt)  {:08x} (phys)",
            l.etext,
            phys(l.etext)
        );
        _ = writeln!(
            out,
            "  edata  {:08x} (virt)  {:08x} (phys)",
            l.edata,
            phys(l.edata)
        );
        _ = writeln!(
            out,
            "  end    {:08x} (virt)  {:08x} (phys)",
            l.end,
            phys(l.end)
        );
        _ = write!(
            out,
            "Kernel executable memory footprint: {}KB",
            l.end.wrapping_sub(l.entry).div_ceil(1024)
        );
        out
    }
}
