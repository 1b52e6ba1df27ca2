mod sql_assembly_tests;
