/*!
Structures of general use, not specific to any one part of the solver.
*/

pub mod split_mix;
