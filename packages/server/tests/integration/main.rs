mod allocation;
mod literature;
mod preview;
