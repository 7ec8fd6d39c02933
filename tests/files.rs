// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

pub const FILES: [&str; 4] = [
    "./tests/vcd-files/ghdl/alu.vcd",
    "./tests/vcd-files/icarus/counter_tb.vcd",
    "./tests/vcd-files/synthetic/clk_toggle.vcd",
    "./tests/vcd-files/synthetic/wide_bus.vcd",
];
